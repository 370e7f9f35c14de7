use std::{hash::Hasher, rc::Rc};

use cinder_bound::{BoundProgram, FunctionId, FunctionKind};
use cinder_error::{EmitErrorKind, EmitResult};
use rustc_hash::{FxHashSet, FxHasher};

use crate::common::FunctionIdent;

/// Resolved names of a single bound function
#[derive(Debug, Clone)]
pub(crate) struct FunctionNames {
    pub ident: Rc<FunctionIdent>,
    /// Prefix of locals and temporaries, `{namespace}/{path}`
    pub local_prefix: Rc<str>,
    /// Prefix of the parameters, stable for every caller
    pub parameter_prefix: Rc<str>,
}

/// Maps every bound function to the function it is emitted as
#[derive(Debug)]
pub(crate) struct FunctionContext {
    names: Vec<FunctionNames>,
}

impl FunctionContext {
    pub fn new(program: &BoundProgram) -> EmitResult<Self> {
        let mut used = FxHashSet::default();
        let names = program
            .functions()
            .map(|(_, function)| {
                let namespace = program
                    .namespace(function.namespace)
                    .ok_or(EmitErrorKind::UnknownNamespace(function.namespace.0))?;
                let namespace = sanitize(&namespace.name);

                let base_path = match function.kind {
                    FunctionKind::Free => sanitize(&function.name),
                    FunctionKind::Method(class) | FunctionKind::Constructor(class) => {
                        let class = program
                            .class(class)
                            .ok_or(EmitErrorKind::UnknownClass(class.0))?;
                        format!("{}/{}", sanitize(&class.name), sanitize(&function.name))
                    }
                };

                let mut path = base_path.clone();
                let mut counter = 1;
                while !used.insert(format!("{namespace}:{path}")) {
                    path = format!("{base_path}_{counter}");
                    counter += 1;
                }

                let ident = FunctionIdent::new(namespace.as_str(), path.as_str());
                Ok(FunctionNames {
                    parameter_prefix: parameter_prefix(&ident).into(),
                    local_prefix: format!("{namespace}/{path}").into(),
                    ident: Rc::new(ident),
                })
            })
            .collect::<EmitResult<_>>()?;

        Ok(FunctionContext { names })
    }

    pub fn names(&self, id: FunctionId) -> EmitResult<&FunctionNames> {
        self.names
            .get(id.0)
            .ok_or_else(|| EmitErrorKind::UnknownFunction(id.0).into())
    }

    pub fn ident(&self, id: FunctionId) -> EmitResult<Rc<FunctionIdent>> {
        self.names(id).map(|names| names.ident.clone())
    }
}

/// `p{hash:08x}` of the fully qualified function name
fn parameter_prefix(ident: &FunctionIdent) -> String {
    let mut hasher = FxHasher::default();
    hasher.write(ident.to_string().as_bytes());
    format!("p{:08x}", hasher.finish() & 0xffff_ffff)
}

/// Converts a name into a valid resource location path segment
pub(crate) fn sanitize(name: &str) -> String {
    name.chars()
        .map(|chr| match chr {
            'a'..='z' | '0'..='9' | '_' | '-' | '.' => chr,
            'A'..='Z' => chr.to_ascii_lowercase(),
            _ => '_',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use cinder_bound::{
        BoundBlock, BoundFunction, BoundProgram, ClassSymbol, FunctionKind, Type,
    };

    use super::FunctionContext;

    #[test]
    fn test_function_names() {
        let mut program = BoundProgram::new();
        let ns = program.add_namespace("Demo");
        let main = program.add_function(BoundFunction::new(
            ns,
            "Main",
            vec![],
            Type::Void,
            BoundBlock::default(),
        ));
        let class = program.add_class(ClassSymbol {
            name: "Point".into(),
            namespace: ns,
            fields: vec![],
            constructor: None,
        });
        let method = program.add_function(
            BoundFunction::new(ns, "len", vec![], Type::Int, BoundBlock::default())
                .with_kind(FunctionKind::Method(class)),
        );
        let overload = program.add_function(BoundFunction::new(
            ns,
            "main",
            vec![],
            Type::Void,
            BoundBlock::default(),
        ));

        let ctx = FunctionContext::new(&program).unwrap();
        assert_eq!(ctx.ident(main).unwrap().to_string(), "demo:main");
        assert_eq!(ctx.ident(method).unwrap().to_string(), "demo:point/len");
        assert_eq!(ctx.ident(overload).unwrap().to_string(), "demo:main_1");
        assert_eq!(&*ctx.names(main).unwrap().local_prefix, "demo/main");

        let prefix = ctx.names(main).unwrap().parameter_prefix.clone();
        assert_eq!(prefix.len(), 9);
        assert!(prefix.starts_with('p'));
        assert_eq!(
            FunctionContext::new(&program).unwrap().names(main).unwrap().parameter_prefix,
            prefix
        );
        assert_ne!(ctx.names(overload).unwrap().parameter_prefix, prefix);
    }
}
