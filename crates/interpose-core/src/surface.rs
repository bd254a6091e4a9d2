//! Capability surfaces: the contracts a generated class must satisfy.

use serde::{Deserialize, Serialize};

use crate::names;
use crate::{JType, MethodDecl, Visibility};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractKind {
    /// Pure behavior surface; implemented by the generated class.
    Interface,
    /// Concrete base type; extended by the generated class.
    Class,
}

/// One requested type in a capability surface.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Contract {
    /// Binary name (`com.acme.Foo`).
    pub name: String,
    pub kind: ContractKind,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(rename = "final", default)]
    pub is_final: bool,
    #[serde(rename = "abstract", default)]
    pub is_abstract: bool,
    /// Exposed methods, in declaration order.
    #[serde(default)]
    pub methods: Vec<MethodDecl>,
    /// Accessible constructor parameter lists (classes only).
    #[serde(default)]
    pub constructors: Vec<Vec<JType>>,
}

impl Contract {
    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(name.into(), ContractKind::Interface)
    }

    /// A public class with a public no-arg constructor.
    pub fn class(name: impl Into<String>) -> Self {
        let mut contract = Self::new(name.into(), ContractKind::Class);
        contract.constructors.push(Vec::new());
        contract
    }

    fn new(name: String, kind: ContractKind) -> Self {
        Self {
            name,
            kind,
            visibility: Visibility::Public,
            is_final: false,
            is_abstract: kind == ContractKind::Interface,
            methods: Vec::new(),
            constructors: Vec::new(),
        }
    }

    pub fn method(mut self, method: MethodDecl) -> Self {
        self.methods.push(method);
        self
    }

    /// Replace the constructor list with the given parameter lists.
    pub fn constructors(mut self, constructors: Vec<Vec<JType>>) -> Self {
        self.constructors = constructors;
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_final(mut self, is_final: bool) -> Self {
        self.is_final = is_final;
        self
    }

    pub fn with_abstract(mut self, is_abstract: bool) -> Self {
        self.is_abstract = is_abstract;
        self
    }

    pub fn is_interface(&self) -> bool {
        self.kind == ContractKind::Interface
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    pub fn internal_name(&self) -> String {
        names::internal_name(&self.name)
    }

    pub fn package(&self) -> &str {
        names::package_of(&self.name)
    }

    /// Constructor whose parameter list equals `args` exactly.
    pub fn find_constructor(&self, args: &[JType]) -> Option<&[JType]> {
        self.constructors
            .iter()
            .find(|params| params.as_slice() == args)
            .map(Vec::as_slice)
    }
}

/// Ordered contract list requested for one generated class.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilitySurface {
    contracts: Vec<Contract>,
}

impl CapabilitySurface {
    pub fn new(contracts: Vec<Contract>) -> Self {
        Self { contracts }
    }

    /// Parse a JSON array of contracts.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn contracts(&self) -> &[Contract] {
        &self.contracts
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }

    pub fn interfaces(&self) -> impl Iterator<Item = &Contract> {
        self.contracts.iter().filter(|c| c.is_interface())
    }

    pub fn bases(&self) -> impl Iterator<Item = &Contract> {
        self.contracts.iter().filter(|c| !c.is_interface())
    }

    /// The first base contract, if any.
    pub fn base(&self) -> Option<&Contract> {
        self.bases().next()
    }

    /// Contract names in surface order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.contracts.iter().map(|c| c.name.as_str())
    }
}

impl FromIterator<Contract> for CapabilitySurface {
    fn from_iter<I: IntoIterator<Item = Contract>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
