//! Expression forms for the AIR, CIR and EIR layers.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{Layer, Literal, Type};

/// An operand position inside an expression.
///
/// A bare string names a node; when no node carries that id it is read as a
/// variable in the current lexical scope. Anything else is an inline
/// expression.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Arg {
    Id(String),
    Inline(Arc<Expr>),
}

impl Arg {
    /// Build an inline operand.
    pub fn inline(expr: Expr) -> Self {
        Arg::Inline(Arc::new(expr))
    }

    /// Build a reference operand.
    pub fn id(id: impl Into<String>) -> Self {
        Arg::Id(id.into())
    }

    pub fn as_id(&self) -> Option<&str> {
        match self {
            Arg::Id(id) => Some(id),
            Arg::Inline(_) => None,
        }
    }

    /// Short description used when printing closures.
    pub fn describe(&self) -> &str {
        match self {
            Arg::Id(id) => id,
            Arg::Inline(_) => "<inline>",
        }
    }
}

impl From<Expr> for Arg {
    fn from(expr: Expr) -> Self {
        Arg::inline(expr)
    }
}

impl From<&str> for Arg {
    fn from(id: &str) -> Self {
        Arg::Id(id.to_owned())
    }
}

/// One expression node. The `kind` tag selects the form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Expr {
    // AIR
    Lit {
        value: Literal,
    },
    Ref {
        id: String,
    },
    Var {
        name: String,
    },
    Input {
        name: String,
    },
    Call {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ns: Option<String>,
        name: String,
        #[serde(default)]
        args: Vec<Arg>,
    },
    If {
        cond: Arg,
        then: Arg,
        #[serde(rename = "else")]
        otherwise: Arg,
    },
    Let {
        name: String,
        value: Arg,
        body: Arg,
    },
    AirRef {
        ns: String,
        name: String,
        #[serde(default)]
        args: Vec<Arg>,
    },
    List {
        of: Type,
        #[serde(default)]
        items: Vec<Arg>,
    },

    // CIR
    Lambda {
        #[serde(default)]
        params: Vec<String>,
        body: Arg,
    },
    Apply {
        #[serde(rename = "fn")]
        callee: Arg,
        #[serde(default)]
        args: Vec<Arg>,
    },
    Fix {
        #[serde(rename = "fn")]
        generator: Arg,
    },

    // EIR
    Seq {
        #[serde(default)]
        body: Vec<Arg>,
    },
    Declare {
        name: String,
        value: Arg,
    },
    Assign {
        name: String,
        value: Arg,
    },
    While {
        cond: Arg,
        body: Arg,
    },
    Effect {
        op: String,
        #[serde(default)]
        args: Vec<Arg>,
    },
}

impl Expr {
    /// The `kind` tag of this form.
    pub const fn form(&self) -> &'static str {
        match self {
            Expr::Lit { .. } => "lit",
            Expr::Ref { .. } => "ref",
            Expr::Var { .. } => "var",
            Expr::Input { .. } => "input",
            Expr::Call { .. } => "call",
            Expr::If { .. } => "if",
            Expr::Let { .. } => "let",
            Expr::AirRef { .. } => "airRef",
            Expr::List { .. } => "list",
            Expr::Lambda { .. } => "lambda",
            Expr::Apply { .. } => "apply",
            Expr::Fix { .. } => "fix",
            Expr::Seq { .. } => "seq",
            Expr::Declare { .. } => "declare",
            Expr::Assign { .. } => "assign",
            Expr::While { .. } => "while",
            Expr::Effect { .. } => "effect",
        }
    }

    /// Lowest layer in which this form is legal.
    pub const fn min_layer(&self) -> Layer {
        match self {
            Expr::Lit { .. }
            | Expr::Ref { .. }
            | Expr::Var { .. }
            | Expr::Input { .. }
            | Expr::Call { .. }
            | Expr::If { .. }
            | Expr::Let { .. }
            | Expr::AirRef { .. }
            | Expr::List { .. } => Layer::Air,
            Expr::Lambda { .. } | Expr::Apply { .. } | Expr::Fix { .. } => Layer::Cir,
            Expr::Seq { .. }
            | Expr::Declare { .. }
            | Expr::Assign { .. }
            | Expr::While { .. }
            | Expr::Effect { .. } => Layer::Eir,
        }
    }

    /// Direct operands, in evaluation order.
    pub fn args(&self) -> Vec<&Arg> {
        match self {
            Expr::Lit { .. } | Expr::Ref { .. } | Expr::Var { .. } | Expr::Input { .. } => {
                Vec::new()
            }
            Expr::Call { args, .. }
            | Expr::AirRef { args, .. }
            | Expr::Effect { args, .. }
            | Expr::List { items: args, .. }
            | Expr::Seq { body: args } => args.iter().collect(),
            Expr::If {
                cond,
                then,
                otherwise,
            } => vec![cond, then, otherwise],
            Expr::Let { value, body, .. } => vec![value, body],
            Expr::Lambda { body, .. } => vec![body],
            Expr::Apply { callee, args } => std::iter::once(callee).chain(args).collect(),
            Expr::Fix { generator } => vec![generator],
            Expr::Declare { value, .. } | Expr::Assign { value, .. } => vec![value],
            Expr::While { cond, body } => vec![cond, body],
        }
    }

    /// First form (depth-first, including inline operands) that needs a
    /// layer above `layer`.
    pub fn first_form_above(&self, layer: Layer) -> Option<&'static str> {
        if self.min_layer() > layer {
            return Some(self.form());
        }
        self.args().into_iter().find_map(|arg| match arg {
            Arg::Inline(expr) => expr.first_form_above(layer),
            Arg::Id(_) => None,
        })
    }
}
