//! Method signatures and declarations.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::JType;

/// Declared access level of a contract or member.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    /// Package-private (no modifier).
    Package,
    Private,
}

/// Structural identity of a callable member: name, ordered parameters, return type.
///
/// Primitive and reference types never compare equal, so `f(int)` and
/// `f(java.lang.Integer)` are different members.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MemberSig {
    pub name: String,
    #[serde(default)]
    pub params: Vec<JType>,
    #[serde(rename = "returns", default = "void")]
    pub ret: JType,
}

fn void() -> JType {
    JType::Void
}

impl MemberSig {
    pub fn new(name: impl Into<String>, params: Vec<JType>, ret: JType) -> Self {
        Self {
            name: name.into(),
            params,
            ret,
        }
    }

    /// Method descriptor, e.g. `(ID)I`.
    pub fn descriptor(&self) -> String {
        let mut out = String::from("(");
        for param in &self.params {
            param.write_descriptor(&mut out);
        }
        out.push(')');
        self.ret.write_descriptor(&mut out);
        out
    }

    /// Canonical identity key, e.g. `add(ID)I`.
    ///
    /// Two members collapse into one generated implementation iff their keys match.
    pub fn key(&self) -> String {
        format!("{}{}", self.name, self.descriptor())
    }

    /// Local variable slots taken by the parameters (long/double count twice).
    pub fn param_slots(&self) -> u16 {
        self.params.iter().map(JType::slots).sum()
    }
}

impl fmt::Display for MemberSig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}(", self.ret, self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{param}")?;
        }
        f.write_str(")")
    }
}

/// A method as declared by a contract.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodDecl {
    #[serde(flatten)]
    pub sig: MemberSig,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(rename = "final", default)]
    pub is_final: bool,
    #[serde(rename = "static", default)]
    pub is_static: bool,
    /// Checked exceptions from the `throws` clause, by binary name.
    #[serde(rename = "throws", default)]
    pub exceptions: Vec<String>,
    /// Declaring type when the member is inherited rather than declared by
    /// the contract that lists it.
    #[serde(rename = "declaredIn", default, skip_serializing_if = "Option::is_none")]
    pub declared_in: Option<String>,
}

impl MethodDecl {
    /// A public, non-final, instance method.
    pub fn new(name: impl Into<String>, params: Vec<JType>, ret: JType) -> Self {
        Self {
            sig: MemberSig::new(name, params, ret),
            visibility: Visibility::Public,
            is_final: false,
            is_static: false,
            exceptions: Vec::new(),
            declared_in: None,
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_final(mut self, is_final: bool) -> Self {
        self.is_final = is_final;
        self
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn throws(mut self, exception: impl Into<String>) -> Self {
        self.exceptions.push(exception.into());
        self
    }

    pub fn declared_in(mut self, owner: impl Into<String>) -> Self {
        self.declared_in = Some(owner.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.sig.name
    }

    pub fn key(&self) -> String {
        self.sig.key()
    }
}
