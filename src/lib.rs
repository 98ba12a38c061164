/*

 Layout of a tree built from [1, 3, 5, 7, 9, 11]. Each node is <index:[start,end]>;
 slots 9, 10, 13 and 14 are padding and hold the neutral element.

                               <0:[0,5]> 36
                     ______________/    \______________
              <1:[0,2]> 9                        <2:[3,5]> 27
             /           \                      /            \
      <3:[0,1]> 4    <4:[2,2]> 5         <5:[3,4]> 16    <6:[5,5]> 11
       /       \                          /       \
 <7:[0,0]> 1  <8:[1,1]> 3          <11:[3,3]> 7  <12:[4,4]> 9

*/

//! A static-size segment tree over an implicit, array-backed binary tree.
//!
//! Supports point updates and range aggregation in `O(log n)`. The
//! aggregation operator is a type parameter implementing [`Aggregate`];
//! [`SumTree`] is the integer range-sum tree.
//!
//! ```
//! use implicit_segment_tree::SumTree;
//!
//! let mut tree = SumTree::new(&[1, 3, 5, 7, 9, 11]).unwrap();
//! assert_eq!(tree.query(1, 3), 15);
//!
//! tree.update(2, 10).unwrap();
//! assert_eq!(tree.query(1, 3), 20);
//! ```

pub mod aggregate;
pub mod error;
pub mod tree;

pub use aggregate::{Aggregate, Max, Min, Sum};
pub use error::{Error, Result};
pub use tree::{SegmentTree, SumTree};
