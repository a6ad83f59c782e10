//! Operation kinds carried by a mutation.

use core::fmt::{self, Display};
use core::ops::BitOr;

/// The category of change a mutation represents.
///
/// A mutation is built with one operation and keeps it for its whole life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Op {
    /// A node that does not exist yet.
    Create,
    /// A change applied to the nodes selected by the persistence engine.
    Update,
    /// A change applied to exactly one node.
    UpdateOne,
    /// Removal of the nodes selected by the persistence engine.
    Delete,
    /// Removal of exactly one node.
    DeleteOne,
}

impl Op {
    /// All operations, in declaration order.
    pub const ALL: [Op; 5] = [
        Op::Create,
        Op::Update,
        Op::UpdateOne,
        Op::Delete,
        Op::DeleteOne,
    ];

    const fn bit(self) -> u8 {
        match self {
            Op::Create => 1,
            Op::Update => 1 << 1,
            Op::UpdateOne => 1 << 2,
            Op::Delete => 1 << 3,
            Op::DeleteOne => 1 << 4,
        }
    }

    /// Returns whether the operation is one of `ops`.
    ///
    /// # Example
    ///
    /// ```
    /// use graph_changeset::Op;
    ///
    /// assert!(Op::UpdateOne.is(Op::Update | Op::UpdateOne));
    /// assert!(!Op::Create.is(Op::Delete.into()));
    /// ```
    #[inline]
    #[must_use]
    pub const fn is(self, ops: Ops) -> bool {
        ops.0 & self.bit() != 0
    }

    /// Returns whether the operation removes nodes.
    ///
    /// Field and edge setters are rejected on such mutations.
    #[inline]
    #[must_use]
    pub const fn is_delete(self) -> bool {
        matches!(self, Op::Delete | Op::DeleteOne)
    }

    /// Returns whether the operation modifies existing nodes.
    #[inline]
    #[must_use]
    pub const fn is_update(self) -> bool {
        matches!(self, Op::Update | Op::UpdateOne)
    }
}

impl Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Op::Create => "Create",
            Op::Update => "Update",
            Op::UpdateOne => "UpdateOne",
            Op::Delete => "Delete",
            Op::DeleteOne => "DeleteOne",
        };
        f.write_str(name)
    }
}

/// A set of operations, used to select which mutations a hook applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Ops(u8);

impl Ops {
    /// The empty set.
    pub const NONE: Ops = Ops(0);

    /// Every operation.
    pub const ALL: Ops = Ops(0b1_1111);

    /// Both update operations.
    pub const UPDATES: Ops = Ops(Op::Update.bit() | Op::UpdateOne.bit());

    /// Both delete operations.
    pub const DELETES: Ops = Ops(Op::Delete.bit() | Op::DeleteOne.bit());

    /// Returns whether the set holds `op`.
    #[inline]
    #[must_use]
    pub const fn contains(self, op: Op) -> bool {
        op.is(self)
    }

    /// Returns whether the set is empty.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl From<Op> for Ops {
    #[inline]
    fn from(op: Op) -> Self {
        Ops(op.bit())
    }
}

impl BitOr for Op {
    type Output = Ops;

    #[inline]
    fn bitor(self, rhs: Self) -> Ops {
        Ops(self.bit() | rhs.bit())
    }
}

impl BitOr<Op> for Ops {
    type Output = Ops;

    #[inline]
    fn bitor(self, rhs: Op) -> Ops {
        Ops(self.0 | rhs.bit())
    }
}

impl BitOr for Ops {
    type Output = Ops;

    #[inline]
    fn bitor(self, rhs: Self) -> Ops {
        Ops(self.0 | rhs.0)
    }
}

// Arbitrary implementations for testing
#[cfg(feature = "testing")]
mod arbitrary_impl {
    use super::Op;
    use arbitrary::{Arbitrary, Unstructured};

    impl<'a> Arbitrary<'a> for Op {
        fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
            Ok(*u.choose(&Op::ALL)?)
        }
    }
}
