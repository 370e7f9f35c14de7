//! Storage allocation for the variables of one emitted function
//!
//! Every lexical block opens a scope in a [`ScopeArena`]. A scope maps
//! `(name, storage kind)` to the [`EmittionVariable`] that holds it, lookups walk
//! outwards through the parent scopes.
use std::{fmt, rc::Rc};

use cinder_bound::Type;
use cinder_common::{FxIndexMap, StorageKind};
use smol_str::SmolStr;

/// Index of a scope inside its [`ScopeArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct ScopeId(usize);

impl ScopeId {
    pub const ROOT: ScopeId = ScopeId(0);
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A variable as it exists on the target
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EmittionVariable {
    pub name: SmolStr,
    /// Score holder name for registers, storage path for tree variables
    pub target: Rc<str>,
    pub ty: Type,
    pub storage: StorageKind,
    /// Temporaries are reset once their scope closes
    pub is_temporary: bool,
    /// `None` for variables that do not belong to any nested scope
    pub scope: Option<ScopeId>,
}

impl EmittionVariable {
    /// A location that is not tracked by any scope, like a field of a tree variable
    pub fn synthetic(target: impl Into<Rc<str>>, ty: Type, storage: StorageKind) -> Self {
        let target = target.into();
        EmittionVariable {
            name: SmolStr::new(&*target),
            target,
            ty,
            storage,
            is_temporary: false,
            scope: None,
        }
    }

    pub fn is_register(&self) -> bool {
        self.storage == StorageKind::Register
    }

    /// Whether both variables name the same target location
    pub fn aliases(&self, other: &EmittionVariable) -> bool {
        self.storage == other.storage && self.target == other.target
    }
}

/// Everything needed to place a new variable
#[derive(Debug, Clone)]
pub(crate) struct VariableRequest<'a> {
    pub name: &'a str,
    pub ty: Type,
    pub storage: StorageKind,
    pub is_temporary: bool,
    /// `false` for parameters, globals and macro staging locations, which
    /// keep their verbatim name at every depth
    pub use_scoping: bool,
    pub location_override: Option<Rc<str>>,
}

impl<'a> VariableRequest<'a> {
    pub fn scoped(name: &'a str, ty: Type, storage: StorageKind) -> Self {
        VariableRequest {
            name,
            ty,
            storage,
            is_temporary: true,
            use_scoping: true,
            location_override: None,
        }
    }

    /// A user declared variable, scoped but never reset
    pub fn local(name: &'a str, ty: Type, storage: StorageKind) -> Self {
        VariableRequest {
            is_temporary: false,
            ..Self::scoped(name, ty, storage)
        }
    }

    pub fn verbatim(name: &'a str, ty: Type, storage: StorageKind) -> Self {
        VariableRequest {
            name,
            ty,
            storage,
            is_temporary: false,
            use_scoping: false,
            location_override: None,
        }
    }
}

#[derive(Debug)]
struct Scope {
    parent: Option<ScopeId>,
    variables: FxIndexMap<(SmolStr, StorageKind), Rc<EmittionVariable>>,
}

/// The chain of scopes of one emitted user function
#[derive(Debug)]
pub(crate) struct ScopeArena {
    prefix: Rc<str>,
    scopes: Vec<Scope>,
    current: ScopeId,
}

impl ScopeArena {
    /// Creates the arena with its root scope, `prefix` is prepended to every scoped name
    pub fn new(prefix: Rc<str>) -> Self {
        ScopeArena {
            prefix,
            scopes: vec![Scope {
                parent: None,
                variables: FxIndexMap::default(),
            }],
            current: ScopeId::ROOT,
        }
    }

    pub fn current(&self) -> ScopeId {
        self.current
    }

    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scopes[scope.0].parent
    }

    /// Opens a child of the current scope and makes it current
    pub fn push(&mut self) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope {
            parent: Some(self.current),
            variables: FxIndexMap::default(),
        });
        self.current = id;
        id
    }

    /// Returns to the parent of the current scope
    pub fn pop(&mut self) {
        if let Some(parent) = self.parent(self.current) {
            self.current = parent;
        }
    }

    /// The scopes from the current one outwards, up to and including `last`
    pub fn chain_to(&self, last: ScopeId) -> Vec<ScopeId> {
        let mut chain = Vec::new();
        let mut scope = Some(self.current);
        while let Some(id) = scope {
            chain.push(id);
            if id == last {
                break;
            }
            scope = self.parent(id);
        }
        chain
    }

    pub fn lookup(&self, name: &str, storage: StorageKind) -> Option<&Rc<EmittionVariable>> {
        let key = (SmolStr::new(name), storage);
        let mut scope = Some(self.current);
        while let Some(id) = scope {
            if let Some(variable) = self.scopes[id.0].variables.get(&key) {
                return Some(variable);
            }
            scope = self.parent(id);
        }
        None
    }

    /// Resolves a variable, declaring it in the current scope if it does not exist.
    ///
    /// Unscoped requests always resolve in the root scope. A variable that is found
    /// with a different type is returned as a copy carrying the requested type.
    pub fn lookup_or_declare(&mut self, request: VariableRequest<'_>) -> Rc<EmittionVariable> {
        let found = if request.use_scoping {
            self.lookup(request.name, request.storage).cloned()
        } else {
            self.scopes[ScopeId::ROOT.0]
                .variables
                .get(&(SmolStr::new(request.name), request.storage))
                .cloned()
        };

        match found {
            Some(variable) if variable.ty == request.ty => variable,
            Some(variable) => Rc::new(EmittionVariable {
                ty: request.ty,
                ..(*variable).clone()
            }),
            None if request.use_scoping => self.declare(request),
            None => self.declare_in(ScopeId::ROOT, request),
        }
    }

    /// Declares a new variable in the current scope, shadowing outer declarations
    pub fn declare(&mut self, request: VariableRequest<'_>) -> Rc<EmittionVariable> {
        self.declare_in(self.current, request)
    }

    /// Declares a new variable in `scope`
    pub fn declare_in(&mut self, scope: ScopeId, request: VariableRequest<'_>) -> Rc<EmittionVariable> {
        let target = match (&request.location_override, request.use_scoping) {
            (Some(location), _) => location.clone(),
            (None, false) => request.name.into(),
            (None, true) if scope == ScopeId::ROOT => {
                format!("{}.{}", self.prefix, request.name).into()
            }
            (None, true) => format!("{}.{}#{scope}", self.prefix, request.name).into(),
        };

        let variable = Rc::new(EmittionVariable {
            name: request.name.into(),
            target,
            ty: request.ty,
            storage: request.storage,
            is_temporary: request.is_temporary,
            scope: (request.use_scoping && scope != ScopeId::ROOT).then_some(scope),
        });
        self.scopes[scope.0]
            .variables
            .insert((variable.name.clone(), variable.storage), variable.clone());
        variable
    }

    /// All variables declared in `scope`, in declaration order
    pub fn locals(&self, scope: ScopeId) -> impl Iterator<Item = &Rc<EmittionVariable>> + '_ {
        self.scopes[scope.0].variables.values()
    }
}
