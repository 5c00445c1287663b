//! Bounding Volume Hierarchies
//!
//! For optimizing computations

use crate::{
    aabb::Aabb,
    objects::{HitRecord, Hittable, HittableList, HittableObj},
    utils, Error, Ray,
};

/// One side of a node: a primitive in the arena or another node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Child {
    Primitive(usize),
    Node(usize),
}

#[derive(Debug, Clone)]
struct BvhNode {
    left: Child,
    right: Child,
    /// Union of both children's boxes
    bbox: Aabb,
}

/// Bounding Volume Hierarchy
///
/// Primitives live in one contiguous arena and nodes refer to them by index.
/// A node built over a single primitive stores the same index in both slots
/// rather than holding two copies of it.
pub struct Bvh {
    primitives: Vec<HittableObj>,
    nodes: Vec<BvhNode>,
    root: usize,
}
impl Bvh {
    /// Build the tree once; it is immutable afterwards
    pub fn new(list: HittableList, time0: f64, time1: f64) -> crate::Result<Self> {
        let primitives = list.0;
        if primitives.is_empty() {
            return Err(Error::EmptyScene);
        }

        let boxes = primitives
            .iter()
            .enumerate()
            .map(|(index, obj)| {
                obj.try_bounding_box(time0, time1)
                    .ok_or(Error::MissingBoundingBox { index })
            })
            .collect::<crate::Result<Vec<_>>>()?;

        let mut order: Vec<usize> = (0..primitives.len()).collect();
        let mut nodes = Vec::with_capacity(primitives.len());
        let root = Self::split_tree(&mut order, &boxes, &mut nodes);

        log::debug!(
            "built bvh over {} primitives with {} nodes",
            primitives.len(),
            nodes.len()
        );

        Ok(Self {
            primitives,
            nodes,
            root,
        })
    }

    /// Split the tree
    ///
    /// Randomly choose an axis, sort the primitives, put half in each subtree.
    /// Returns the index of the node covering `order`.
    fn split_tree(order: &mut [usize], boxes: &[Aabb], nodes: &mut Vec<BvhNode>) -> usize {
        let axis: usize = utils::random_range(0..3);
        // Stable sort on the box minimum along the chosen axis
        order.sort_by(|&a, &b| boxes[a].min[axis].total_cmp(&boxes[b].min[axis]));

        let (left, right) = match order.len() {
            1 => (Child::Primitive(order[0]), Child::Primitive(order[0])),
            2 => (Child::Primitive(order[0]), Child::Primitive(order[1])),
            n => {
                let (left_half, right_half) = order.split_at_mut(n / 2);
                let left = Self::split_tree(left_half, boxes, nodes);
                let right = Self::split_tree(right_half, boxes, nodes);
                (Child::Node(left), Child::Node(right))
            }
        };

        let child_box = |child: Child, nodes: &[BvhNode]| match child {
            Child::Primitive(i) => boxes[i],
            Child::Node(i) => nodes[i].bbox,
        };
        let bbox = child_box(left, nodes.as_slice())
            .surrounding_box(&child_box(right, nodes.as_slice()));

        nodes.push(BvhNode { left, right, bbox });
        nodes.len() - 1
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    fn hit_child(&self, child: Child, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>> {
        match child {
            Child::Primitive(i) => self.primitives[i].try_hit(ray, t_min, t_max),
            Child::Node(i) => self.hit_node(i, ray, t_min, t_max),
        }
    }

    fn hit_node(&self, index: usize, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>> {
        let node = &self.nodes[index];
        if !node.bbox.hit(ray, t_min, t_max) {
            return None;
        }
        // Both sides are always tested over the full window
        let left = self.hit_child(node.left, ray, t_min, t_max);
        let right = self.hit_child(node.right, ray, t_min, t_max);
        match (left, right) {
            (Some(l), Some(r)) => {
                if l.t < r.t {
                    Some(l)
                } else {
                    Some(r)
                }
            }
            (Some(l), None) => Some(l),
            (None, r) => r,
        }
    }
}
impl Hittable for Bvh {
    fn try_hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>> {
        self.hit_node(self.root, ray, t_min, t_max)
    }

    fn try_bounding_box(&self, _time0: f64, _time1: f64) -> Option<Aabb> {
        Some(self.nodes[self.root].bbox)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::materials::Lambertian;
    use crate::mediums::ConstantMedium;
    use crate::objects::{Cuboid, Rectangle, Sphere};
    use crate::transrot::{RotateY, Translate};
    use crate::{Color, Material, Point, Vec3};

    fn grey() -> Material {
        Arc::new(Lambertian::new(Color::repeat(0.5)))
    }

    fn random_point(scale: f64) -> Point {
        Point::new(
            utils::random_range(-scale..scale),
            utils::random_range(-scale..scale),
            utils::random_range(-scale..scale),
        )
    }

    /// Mixed primitives scattered through a cube; built twice for bvh and brute force
    fn scene(seed: u64, count: usize) -> HittableList {
        utils::reseed(seed);
        let mut list = HittableList::default();
        for k in 0..count {
            let c = random_point(10.0);
            let obj: HittableObj = match k % 4 {
                0 => Box::new(Sphere::new(c, utils::random_range(0.2..1.5), grey())),
                1 => Box::new(Rectangle::xz(c[0], c[0] + 1.0, c[2], c[2] + 2.0, c[1], grey())),
                2 => Box::new(Translate::new(
                    Box::new(RotateY::new(
                        Box::new(Cuboid::new(Point::zeros(), Point::repeat(1.0), grey())),
                        utils::random_range(0.0..360.0),
                    )),
                    c,
                )),
                _ => Box::new(Rectangle::yz(c[1], c[1] + 0.5, c[2], c[2] + 0.5, c[0], grey())),
            };
            list.add(obj);
        }
        list
    }

    fn check_node(bvh: &Bvh, index: usize) -> Aabb {
        let node = &bvh.nodes[index];
        for child in [node.left, node.right] {
            let child_box = match child {
                Child::Primitive(i) => bvh.primitives[i].try_bounding_box(0.0, 1.0).unwrap(),
                Child::Node(i) => check_node(bvh, i),
            };
            assert!(node.bbox.contains(&child_box));
        }
        node.bbox
    }

    #[test]
    fn empty_list_is_an_error() {
        assert!(matches!(
            Bvh::new(HittableList::default(), 0.0, 1.0),
            Err(Error::EmptyScene)
        ));
    }

    #[test]
    fn unbounded_primitive_is_an_error() {
        let mut list = HittableList::default();
        list.add(Box::new(Sphere::new(Point::zeros(), 1.0, grey())));
        list.add(Box::new(HittableList::default()));
        assert!(matches!(
            Bvh::new(list, 0.0, 1.0),
            Err(Error::MissingBoundingBox { index: 1 })
        ));
    }

    #[test]
    fn single_primitive_aliases_both_children() {
        let mut list = HittableList::default();
        list.add(Box::new(Sphere::new(Point::new(0.0, 0.0, -5.0), 1.0, grey())));
        let bvh = Bvh::new(list, 0.0, 1.0).unwrap();
        assert_eq!(bvh.len(), 1);
        assert_eq!(bvh.nodes.len(), 1);
        assert_eq!(bvh.nodes[0].left, Child::Primitive(0));
        assert_eq!(bvh.nodes[0].left, bvh.nodes[0].right);

        let ray = Ray::new(Point::zeros(), Vec3::new(0.0, 0.0, -1.0), 0.0);
        let hr = bvh.try_hit(&ray, 0.001, f64::INFINITY).unwrap();
        assert!((hr.t - 4.0).abs() < 1e-9);
    }

    #[test]
    fn every_node_box_contains_its_children() {
        for seed in 0..5 {
            let bvh = Bvh::new(scene(seed, 57), 0.0, 1.0).unwrap();
            let root_box = check_node(&bvh, bvh.root);
            for obj in &bvh.primitives {
                assert!(root_box.contains(&obj.try_bounding_box(0.0, 1.0).unwrap()));
            }
        }
    }

    #[test]
    fn every_primitive_is_reachable_once_split() {
        let bvh = Bvh::new(scene(3, 40), 0.0, 1.0).unwrap();
        let mut seen = vec![0; bvh.len()];
        for node in &bvh.nodes {
            if let Child::Primitive(i) = node.left {
                seen[i] += 1;
            }
            // An aliased single-primitive node counts once
            if let Child::Primitive(i) = node.right {
                if node.right != node.left {
                    seen[i] += 1;
                }
            }
        }
        assert!(seen.iter().all(|&n| n == 1));
    }

    #[test]
    fn matches_linear_scan() {
        for seed in 10..14 {
            let bvh = Bvh::new(scene(seed, 64), 0.0, 1.0).unwrap();
            let brute = scene(seed, 64);

            utils::reseed(seed + 100);
            for _ in 0..2000 {
                let ray = Ray::new(random_point(15.0), random_point(1.0), 0.0);
                let a = bvh.try_hit(&ray, 0.001, f64::INFINITY).map(|hr| hr.t);
                let b = brute.try_hit(&ray, 0.001, f64::INFINITY).map(|hr| hr.t);
                match (a, b) {
                    (Some(a), Some(b)) => assert!((a - b).abs() < 1e-9, "{a} != {b}"),
                    (None, None) => {}
                    other => panic!("bvh and linear scan disagree: {other:?}"),
                }
            }
        }
    }

    #[test]
    fn axis_aligned_rays_do_not_break_traversal() {
        let bvh = Bvh::new(scene(2, 30), 0.0, 1.0).unwrap();
        let brute = scene(2, 30);
        for axis in 0..3 {
            for sign in [-1.0, 1.0] {
                let mut dir = Vec3::zeros();
                dir[axis] = sign;
                for k in 0..50 {
                    let mut orig = Point::repeat(k as f64 * 0.4 - 10.0);
                    orig[axis] = -sign * 20.0;
                    let ray = Ray::new(orig, dir, 0.0);
                    let a = bvh.try_hit(&ray, 0.001, f64::INFINITY).map(|hr| hr.t);
                    let b = brute.try_hit(&ray, 0.001, f64::INFINITY).map(|hr| hr.t);
                    assert_eq!(a.is_some(), b.is_some());
                    if let (Some(a), Some(b)) = (a, b) {
                        assert!((a - b).abs() < 1e-9);
                    }
                }
            }
        }
    }

    #[test]
    fn media_can_be_placed_in_a_bvh() {
        let mut list = HittableList::default();
        list.add(Box::new(ConstantMedium::from_color(
            Box::new(Sphere::new(Point::zeros(), 1.0, grey())),
            0.5,
            Color::repeat(1.0),
        )));
        list.add(Box::new(Sphere::new(Point::new(5.0, 0.0, 0.0), 1.0, grey())));
        let bvh = Bvh::new(list, 0.0, 1.0).unwrap();
        let bbox = bvh.try_bounding_box(0.0, 1.0).unwrap();
        assert_eq!(bbox.min, Point::new(-1.0, -1.0, -1.0));
        assert_eq!(bbox.max, Point::new(6.0, 1.0, 1.0));
    }
}
