//! The emitted program, before it is laid out as files
use std::rc::Rc;

use cinder_common::FxIndexMap;

use crate::common::{CommandNode, FunctionIdent};

/// A single emitted function together with the sub-functions fabricated for it
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionEmission {
    pub ident: Rc<FunctionIdent>,
    pub content: CommandNode,
    pub sub_functions: Vec<FunctionEmission>,
}

impl FunctionEmission {
    /// Visits this function and every nested sub-function, parents first
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a FunctionEmission)) {
        visit(self);
        for sub_function in &self.sub_functions {
            sub_function.walk(visit);
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.mcfunction", self.ident.path)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamespaceEmission {
    pub name: Rc<str>,
    pub functions: Vec<FunctionEmission>,
}

/// Everything a compilation produced
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProgramEmission {
    pub namespaces: FxIndexMap<Rc<str>, NamespaceEmission>,
    /// Functions referenced by the `minecraft:load` tag
    pub load: Vec<Rc<FunctionIdent>>,
    /// Functions referenced by the `minecraft:tick` tag
    pub tick: Vec<Rc<FunctionIdent>>,
}

impl ProgramEmission {
    pub fn push_function(&mut self, function: FunctionEmission) {
        let name = function.ident.namespace.clone();
        self.namespaces
            .entry(name.clone())
            .or_insert_with(|| NamespaceEmission {
                name,
                functions: Vec::new(),
            })
            .functions
            .push(function);
    }

    #[cfg(test)]
    /// Finds a function or sub-function by its full name, e.g. `demo:main_sif0`
    pub fn find(&self, full_name: &str) -> Option<&FunctionEmission> {
        let mut found = None;
        self.for_each_function(&mut |function| {
            if found.is_none() && function.ident.to_string() == full_name {
                found = Some(function);
            }
        });
        found
    }

    pub fn for_each_function<'a>(&'a self, visit: &mut impl FnMut(&'a FunctionEmission)) {
        for namespace in self.namespaces.values() {
            for function in &namespace.functions {
                function.walk(visit);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use crate::common::{CommandNode, FunctionIdent};

    use super::{FunctionEmission, ProgramEmission};

    fn function(namespace: &str, path: &str, sub_functions: Vec<FunctionEmission>) -> FunctionEmission {
        FunctionEmission {
            ident: Rc::new(FunctionIdent::new(namespace, path)),
            content: CommandNode::Block(vec![]),
            sub_functions,
        }
    }

    #[test]
    fn test_find_nested() {
        let mut program = ProgramEmission::default();
        program.push_function(function(
            "demo",
            "main",
            vec![function("demo", "main_sl0", vec![function("demo", "main_sl0_sif0", vec![])])],
        ));
        program.push_function(function("other", "f", vec![]));

        assert!(program.find("demo:main_sl0_sif0").is_some());
        assert!(program.find("demo:missing").is_none());
        assert_eq!(program.namespaces.len(), 2);

        let mut names = Vec::new();
        program.for_each_function(&mut |function| names.push(function.ident.to_string()));
        assert_eq!(
            names,
            vec!["demo:main", "demo:main_sl0", "demo:main_sl0_sif0", "other:f"]
        );
    }
}
