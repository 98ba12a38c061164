use std::fmt;

use tracing::{debug, trace};

use crate::aggregate::{Aggregate, Sum};
use crate::error::{Error, Result};

/// Integer range-sum tree.
pub type SumTree = SegmentTree<Sum<i64>>;

/// A static-size segment tree stored as an implicit binary tree.
///
/// Node `i` has children `2i + 1` and `2i + 2`. The root covers `[0, len - 1]`
/// and every internal node covering `[start, end]` splits at
/// `mid = (start + end) / 2`. The backing store holds `2 * 2^height - 1`
/// slots; slots not reachable from `[0, len - 1]` hold `A::neutral()`.
pub struct SegmentTree<A: Aggregate> {
    tree: Vec<A::Value>,
    len: usize,
    height: u32,
}

impl<A: Aggregate> SegmentTree<A> {
    /// Builds a tree over `values`.
    ///
    /// Returns [`Error::Empty`] if `values` is empty.
    pub fn new(values: &[A::Value]) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::Empty);
        }

        let len = values.len();
        // ceil(log2(len)), zero for a single element.
        let height = len.next_power_of_two().trailing_zeros();
        let tree_size = 2 * (1usize << height) - 1;

        let mut seg_tree = Self {
            tree: vec![A::neutral(); tree_size],
            len,
            height,
        };
        seg_tree.build(values, 0, 0, len - 1);

        debug!(len, height, capacity = tree_size, "built segment tree");
        Ok(seg_tree)
    }

    fn build(&mut self, values: &[A::Value], node: usize, start: usize, end: usize) -> A::Value {
        let value = if start == end {
            values[start]
        } else {
            let mid = midpoint(start, end);
            let left = self.build(values, node * 2 + 1, start, mid);
            let right = self.build(values, node * 2 + 2, mid + 1, end);
            A::combine(left, right)
        };
        self.tree[node] = value;
        value
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always `false`: a tree cannot be built from an empty sequence.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of slots in the backing store, padding included.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.tree.len()
    }

    /// Raw backing store in implicit node order.
    #[inline]
    pub fn nodes(&self) -> &[A::Value] {
        &self.tree
    }

    /// Aggregate over the whole sequence.
    #[inline]
    pub fn total(&self) -> A::Value {
        self.tree[0]
    }

    pub fn get(&self, index: usize) -> Option<A::Value> {
        (index < self.len).then(|| self.query(index, index))
    }

    /// Aggregates the elements with index in the inclusive range `[left, right]`.
    ///
    /// Bounds are not validated. Only indices inside `[0, len - 1]` contribute,
    /// so an inverted range or a range entirely past the end yields
    /// `A::neutral()`, and a `right` past the end behaves as `len - 1`.
    pub fn query(&self, left: usize, right: usize) -> A::Value {
        self.query_dfs(0, 0, self.len - 1, left, right)
    }

    fn query_dfs(
        &self,
        node: usize,
        start: usize,
        end: usize,
        left: usize,
        right: usize,
    ) -> A::Value {
        if left > end || right < start {
            // no overlap
            return A::neutral();
        }

        if left <= start && end <= right {
            // total overlap
            return self.tree[node];
        }

        let mid = midpoint(start, end);
        A::combine(
            self.query_dfs(node * 2 + 1, start, mid, left, right),
            self.query_dfs(node * 2 + 2, mid + 1, end, left, right),
        )
    }

    /// Same result as [`query`](Self::query), computed with an explicit stack
    /// instead of recursion.
    pub fn query_iterative(&self, left: usize, right: usize) -> A::Value {
        let mut stack = vec![(0, 0, self.len - 1)];
        let mut result = A::neutral();

        while let Some((node, start, end)) = stack.pop() {
            if left > end || right < start {
                continue;
            }

            if left <= start && end <= right {
                result = A::combine(result, self.tree[node]);
                continue;
            }

            // Right is pushed first so the left half is combined first.
            let mid = midpoint(start, end);
            stack.push((node * 2 + 2, mid + 1, end));
            stack.push((node * 2 + 1, start, mid));
        }

        result
    }

    /// Replaces the element at `index` with `value` and repairs every
    /// aggregate on the path to the root.
    ///
    /// Returns [`Error::IndexOutOfBounds`] without touching the tree if
    /// `index >= len`.
    pub fn update(&mut self, index: usize, value: A::Value) -> Result<()> {
        fn update_recursive<A: Aggregate>(
            tree: &mut [A::Value],
            node: usize,
            start: usize,
            end: usize,
            index: usize,
            value: A::Value,
        ) {
            if index < start || index > end {
                return;
            }

            if start == end {
                tree[node] = value;
                return;
            }

            let left_child = node * 2 + 1;
            let right_child = node * 2 + 2;
            let mid = midpoint(start, end);

            update_recursive::<A>(tree, left_child, start, mid, index, value);
            update_recursive::<A>(tree, right_child, mid + 1, end, index, value);

            tree[node] = A::combine(tree[left_child], tree[right_child]);
        }

        if index >= self.len {
            debug!(index, len = self.len, "rejected out-of-bounds update");
            return Err(Error::IndexOutOfBounds {
                index,
                len: self.len,
            });
        }

        update_recursive::<A>(&mut self.tree, 0, 0, self.len - 1, index, value);
        trace!(index, ?value, "updated segment tree");
        Ok(())
    }

    /// Current logical sequence, read back from the leaves.
    pub fn values(&self) -> Vec<A::Value> {
        fn collect_leaves<A: Aggregate>(
            tree: &[A::Value],
            node: usize,
            start: usize,
            end: usize,
            out: &mut Vec<A::Value>,
        ) {
            if start == end {
                out.push(tree[node]);
                return;
            }
            let mid = midpoint(start, end);
            collect_leaves::<A>(tree, node * 2 + 1, start, mid, out);
            collect_leaves::<A>(tree, node * 2 + 2, mid + 1, end, out);
        }

        let mut out = Vec::with_capacity(self.len);
        collect_leaves::<A>(&self.tree, 0, 0, self.len - 1, &mut out);
        out
    }

    /// Checks that every internal node equals the combination of its
    /// children and that every unreachable padding slot holds the neutral
    /// element.
    ///
    /// Values that are unequal to themselves, such as `f64::NAN`, compare
    /// equal to each other here.
    pub fn is_consistent(&self) -> bool {
        fn check<A: Aggregate>(
            tree: &[A::Value],
            reached: &mut [bool],
            node: usize,
            start: usize,
            end: usize,
        ) -> bool {
            reached[node] = true;
            if start == end {
                return true;
            }

            let left_child = node * 2 + 1;
            let right_child = node * 2 + 2;
            let mid = midpoint(start, end);

            check::<A>(tree, reached, left_child, start, mid)
                && check::<A>(tree, reached, right_child, mid + 1, end)
                && same_value(tree[node], A::combine(tree[left_child], tree[right_child]))
        }

        let mut reached = vec![false; self.tree.len()];
        check::<A>(&self.tree, &mut reached, 0, 0, self.len - 1)
            && reached
                .iter()
                .zip(&self.tree)
                .all(|(&hit, &value)| hit || same_value(value, A::neutral()))
    }

    fn fmt_node(
        &self,
        f: &mut fmt::Formatter<'_>,
        node: usize,
        start: usize,
        end: usize,
        depth: usize,
        is_right: bool,
    ) -> fmt::Result {
        let mid = midpoint(start, end);

        if start < end {
            self.fmt_node(f, node * 2 + 2, mid + 1, end, depth + 1, true)?;
        }

        let indent = "      ".repeat(depth);
        let branch = if is_right { " /" } else { " \\" };
        writeln!(
            f,
            "{}{}----<{},[{},{}]> {:?}",
            indent, branch, node, start, end, self.tree[node]
        )?;

        if start < end {
            self.fmt_node(f, node * 2 + 1, start, mid, depth + 1, false)?;
        }
        Ok(())
    }
}

/// Equality that treats two self-unequal values (NaN) as the same.
#[inline]
fn same_value<T: PartialEq>(a: T, b: T) -> bool {
    #[allow(clippy::eq_op)]
    let both_unordered = a != a && b != b;
    a == b || both_unordered
}

#[inline]
fn midpoint(start: usize, end: usize) -> usize {
    start + (end - start) / 2
}

impl<A: Aggregate> Clone for SegmentTree<A> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
            len: self.len,
            height: self.height,
        }
    }
}

impl<A: Aggregate> fmt::Debug for SegmentTree<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SegmentTree")
            .field("len", &self.len)
            .field("height", &self.height)
            .field("tree", &self.tree)
            .finish()
    }
}

/// Renders the tree sideways: right subtree above, left subtree below, one
/// node per line as `<node,[start,end]> value`.
impl<A: Aggregate> fmt::Display for SegmentTree<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_node(f, 0, 0, self.len - 1, 0, true)
    }
}

#[cfg(test)]
mod tests {
    use super::{SegmentTree, SumTree};
    use crate::aggregate::{Max, Min, Sum};
    use crate::error::Error;

    fn tree_data() -> (Vec<i64>, SumTree) {
        let data = vec![1, 3, 5, 7, 9, 11];
        let tree = SumTree::new(&data).unwrap();
        (data, tree)
    }

    #[test]
    fn build() {
        let (data, tree) = tree_data();

        assert_eq!(tree.len(), data.len());
        assert_eq!(tree.height(), 3);
        assert_eq!(tree.capacity(), 15);
        assert_eq!(
            tree.nodes(),
            &[36, 9, 27, 4, 5, 16, 11, 1, 3, 0, 0, 7, 9, 0, 0]
        );
        assert_eq!(tree.total(), 36);
        assert!(tree.is_consistent());
    }

    #[test]
    fn sum() {
        let (_, tree) = tree_data();

        assert_eq!(tree.query(1, 3), 15);
        assert_eq!(tree.query(0, 5), 36);
        assert_eq!(tree.query(4, 5), 20);
        assert_eq!(tree.query(2, 2), 5);
    }

    #[test]
    fn update() {
        let (_, mut tree) = tree_data();

        tree.update(2, 10).unwrap();

        assert_eq!(tree.query(1, 3), 20);
        assert_eq!(tree.query(3, 5), 27);
        assert_eq!(
            tree.nodes(),
            &[41, 14, 27, 4, 10, 16, 11, 1, 3, 0, 0, 7, 9, 0, 0]
        );
        assert_eq!(tree.values(), vec![1, 3, 10, 7, 9, 11]);
        assert!(tree.is_consistent());
    }

    #[test]
    fn single_element() {
        let mut tree = SumTree::new(&[4]).unwrap();

        assert_eq!(tree.height(), 0);
        assert_eq!(tree.capacity(), 1);
        assert_eq!(tree.query(0, 0), 4);

        tree.update(0, 9).unwrap();
        assert_eq!(tree.query(0, 0), 9);
        assert_eq!(tree.total(), 9);
    }

    #[test]
    fn non_power_of_two() {
        let tree = SumTree::new(&[2, 4, 6, 8, 10]).unwrap();

        assert_eq!(tree.height(), 3);
        assert_eq!(tree.capacity(), 15);
        assert_eq!(tree.query(0, 4), 30);
        assert_eq!(tree.query(1, 3), 18);
        assert!(tree.is_consistent());
    }

    #[test]
    fn power_of_two_is_not_padded() {
        let tree = SumTree::new(&[1, 2, 3, 4]).unwrap();

        assert_eq!(tree.height(), 2);
        assert_eq!(tree.capacity(), 7);
        assert_eq!(tree.nodes(), &[10, 3, 7, 1, 2, 3, 4]);
    }

    #[test]
    fn query_outside_range_is_neutral() {
        let (_, tree) = tree_data();

        assert_eq!(tree.query(3, 1), 0);
        assert_eq!(tree.query(6, 10), 0);
        assert_eq!(tree.query_iterative(3, 1), 0);
        assert_eq!(tree.query_iterative(6, 10), 0);
    }

    #[test]
    fn query_past_end_is_clamped() {
        let (_, tree) = tree_data();

        assert_eq!(tree.query(4, 100), 20);
        assert_eq!(tree.query(0, usize::MAX), 36);
    }

    #[test]
    fn query_iterative() {
        let (data, tree) = tree_data();

        for left in 0..data.len() {
            for right in left..data.len() {
                assert_eq!(tree.query_iterative(left, right), tree.query(left, right));
            }
        }
    }

    #[test]
    fn empty_input() {
        assert_eq!(SumTree::new(&[]).unwrap_err(), Error::Empty);
    }

    #[test]
    fn update_out_of_bounds() {
        let (_, mut tree) = tree_data();
        let before = tree.nodes().to_vec();

        assert_eq!(
            tree.update(6, 100),
            Err(Error::IndexOutOfBounds { index: 6, len: 6 })
        );
        assert_eq!(tree.nodes(), before.as_slice());
    }

    #[test]
    fn get() {
        let (data, tree) = tree_data();

        for (i, &v) in data.iter().enumerate() {
            assert_eq!(tree.get(i), Some(v));
        }
        assert_eq!(tree.get(data.len()), None);
    }

    #[test]
    fn min() {
        let mut tree = SegmentTree::<Min<i32>>::new(&[5, 2, 8, 1, 9]).unwrap();

        assert_eq!(tree.query(0, 2), 2);
        assert_eq!(tree.query(2, 4), 1);
        assert_eq!(tree.query(3, 1), i32::MAX);

        tree.update(3, 10).unwrap();
        assert_eq!(tree.query(2, 4), 8);
        assert!(tree.is_consistent());
    }

    #[test]
    fn max() {
        let mut tree = SegmentTree::<Max<u64>>::new(&[5, 2, 8, 1, 9]).unwrap();

        assert_eq!(tree.query(0, 3), 8);
        assert_eq!(tree.total(), 9);

        tree.update(4, 0).unwrap();
        assert_eq!(tree.total(), 8);
        assert!(tree.is_consistent());
    }

    #[test]
    fn float_sum() {
        let tree = SegmentTree::<Sum<f64>>::new(&[0.5, 0.25, 0.125]).unwrap();

        assert_eq!(tree.query(0, 2), 0.875);
        assert_eq!(tree.query(1, 2), 0.375);
    }

    #[test]
    fn sum_overflow_wraps() {
        let tree = SumTree::new(&[i64::MAX, 1]).unwrap();
        assert_eq!(tree.total(), i64::MIN);
        assert_eq!(tree.query(0, 1), i64::MIN);
        assert!(tree.is_consistent());

        let mut tree = SumTree::new(&[1, 1]).unwrap();
        tree.update(0, i64::MAX).unwrap();
        assert_eq!(tree.total(), i64::MIN);
        assert_eq!(tree.query(1, 1), 1);

        tree.update(1, -1).unwrap();
        assert_eq!(tree.total(), i64::MAX - 1);
        assert!(tree.is_consistent());
    }

    #[test]
    fn nan_leaf_is_consistent() {
        let tree = SegmentTree::<Sum<f64>>::new(&[1.0, f64::NAN, 2.0]).unwrap();
        assert!(tree.total().is_nan());
        assert!(tree.is_consistent());

        let tree = SegmentTree::<Max<f64>>::new(&[f64::NAN, f64::NAN, 3.0]).unwrap();
        assert_eq!(tree.total(), 3.0);
        assert!(tree.is_consistent());
    }

    #[test]
    fn display() {
        let tree = SumTree::new(&[4]).unwrap();
        assert_eq!(tree.to_string(), " /----<0,[0,0]> 4\n");

        let tree = SumTree::new(&[1, 2]).unwrap();
        assert_eq!(
            tree.to_string(),
            "      /----<2,[1,1]> 2\n /----<0,[0,1]> 3\n      \\----<1,[0,0]> 1\n"
        );
    }
}
