//! IR layers and their capability policy.
//!
//! Layers are ordered by expressiveness: every form legal in a lower layer
//! is legal in the layers above it.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    /// Primitive recursive. Always terminates.
    Air,
    /// Adds lambdas, closures and fixpoint recursion.
    Cir,
    /// Adds sequencing, mutable bindings, loops and effects.
    Eir,
    /// Control-flow graph form, optionally with fork/join.
    Lir,
}

impl Layer {
    pub const fn allows_closures(self) -> bool {
        !matches!(self, Layer::Air)
    }

    pub const fn allows_effects(self) -> bool {
        matches!(self, Layer::Eir | Layer::Lir)
    }

    /// Whether bindings introduced in this layer can be reassigned.
    pub const fn allows_mutation(self) -> bool {
        matches!(self, Layer::Eir | Layer::Lir)
    }

    pub const fn allows_fork(self) -> bool {
        matches!(self, Layer::Lir)
    }

    /// Whether closures capture a read-only copy of their scope instead of
    /// sharing it.
    ///
    /// LIR closures are created over the register frame, which a forked task
    /// must not observe changing after the fork. A closure value copied into
    /// a forked task still points at the same captured scope, so that scope
    /// must not be writable either.
    pub const fn captures_by_copy(self) -> bool {
        matches!(self, Layer::Lir)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Layer::Air => "air",
            Layer::Cir => "cir",
            Layer::Eir => "eir",
            Layer::Lir => "lir",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
