//! Type system representation.
//!
//! Types are stored in a `TypeTable` (type arena) and referenced by `TypeId`.
//! This avoids lifetime issues with recursive type structures. A table lives
//! for exactly one checking run.

use crate::error::ConstructionError;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use tyshape_core::intern::{Name, NameTable};

/// Maximum recursion depth for type stringification to prevent stack overflow.
const MAX_TYPE_TO_STRING_DEPTH: u32 = 20;

/// Index of a type in its `TypeTable`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

impl TypeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Coarse classification of a type, derived from its kind.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TypeFlags: u32 {
        const PRIMITIVE         = 1 << 0;
        const UNKNOWN           = 1 << 1;
        const OBJECT            = 1 << 2;
        const FUNCTION          = 1 << 3;
        const TYPE_PARAMETER    = 1 << 4;
        const GENERIC           = 1 << 5;
        const INSTANTIATED      = 1 << 6;
        const PENDING           = 1 << 7;

        const OBJECT_LIKE = Self::OBJECT.bits() | Self::INSTANTIATED.bits();
        /// Types that relate to everything in both directions.
        const WILDCARD = Self::UNKNOWN.bits() | Self::PENDING.bits();
    }
}

/// A type in the table.
#[derive(Debug, Clone)]
pub struct Type {
    pub id: TypeId,
    pub flags: TypeFlags,
    pub kind: TypeKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    /// `string`, `number`, `boolean`, `void`, `null`, `undefined`
    Primitive { name: &'static str },
    /// The escape hatch, assignable to and from anything.
    Unknown,
    Object(ObjectType),
    Function(FunctionType),
    TypeParameter(TypeParameter),
    /// A generic interface declaration: the origin of instantiations.
    Generic(GenericType),
    /// `Origin<Args>`
    Instantiated(InstantiatedType),
    /// Reserved for a forward-referenced declaration whose body is not built yet.
    Pending,
}

impl TypeKind {
    fn flags(&self) -> TypeFlags {
        match self {
            TypeKind::Primitive { .. } => TypeFlags::PRIMITIVE,
            TypeKind::Unknown => TypeFlags::UNKNOWN,
            TypeKind::Object(_) => TypeFlags::OBJECT,
            TypeKind::Function(_) => TypeFlags::FUNCTION,
            TypeKind::TypeParameter(_) => TypeFlags::TYPE_PARAMETER,
            TypeKind::Generic(_) => TypeFlags::GENERIC,
            TypeKind::Instantiated(_) => TypeFlags::INSTANTIATED,
            TypeKind::Pending => TypeFlags::PENDING,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Property {
    pub type_id: TypeId,
    pub optional: bool,
}

impl Property {
    pub fn required(type_id: TypeId) -> Self {
        Self { type_id, optional: false }
    }

    pub fn optional(type_id: TypeId) -> Self {
        Self { type_id, optional: true }
    }
}

/// An object type. Property names are unique and keep declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectType {
    /// Declared name (interfaces), used only for display.
    pub name: Option<Name>,
    pub properties: IndexMap<Name, Property>,
}

impl ObjectType {
    pub fn new(
        name: Option<Name>,
        properties: impl IntoIterator<Item = (Name, Property)>,
        names: &NameTable,
    ) -> Result<Self, ConstructionError> {
        let mut map = IndexMap::new();
        for (prop_name, prop) in properties {
            if map.insert(prop_name, prop).is_some() {
                return Err(ConstructionError::DuplicateProperty(
                    names.resolve(prop_name).to_string(),
                ));
            }
        }
        Ok(Self { name, properties: map })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parameter {
    pub name: Name,
    pub type_id: TypeId,
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionType {
    pub type_parameters: Vec<TypeId>,
    pub parameters: Vec<Parameter>,
    pub return_type: TypeId,
}

impl FunctionType {
    /// Number of arguments a caller must supply.
    pub fn min_argument_count(&self) -> usize {
        self.parameters
            .iter()
            .rposition(|p| !p.optional)
            .map_or(0, |i| i + 1)
    }

    pub fn is_generic(&self) -> bool {
        !self.type_parameters.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeParameter {
    pub name: Name,
    pub constraint: Option<TypeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenericType {
    pub name: Name,
    pub type_parameters: Vec<TypeId>,
    pub body: TypeId,
}

/// Bindings are keyed by type parameter name and kept in the origin's
/// declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct InstantiatedType {
    pub origin: TypeId,
    pub bindings: IndexMap<Name, TypeId>,
}

/// The type table stores all types and provides access by `TypeId`.
#[derive(Debug)]
pub struct TypeTable {
    types: Vec<Type>,
    names: NameTable,
    /// Resolved bodies of instantiated types, keyed by origin and arguments.
    pub(crate) instantiations: FxHashMap<(TypeId, Vec<TypeId>), TypeId>,
    // Well-known types
    pub string_type: TypeId,
    pub number_type: TypeId,
    pub boolean_type: TypeId,
    pub void_type: TypeId,
    pub null_type: TypeId,
    pub undefined_type: TypeId,
    pub unknown_type: TypeId,
}

impl TypeTable {
    pub fn new(names: NameTable) -> Self {
        let mut table = Self {
            types: Vec::with_capacity(256),
            names,
            instantiations: FxHashMap::default(),
            string_type: TypeId(0),
            number_type: TypeId(1),
            boolean_type: TypeId(2),
            void_type: TypeId(3),
            null_type: TypeId(4),
            undefined_type: TypeId(5),
            unknown_type: TypeId(6),
        };

        table.add_type(TypeKind::Primitive { name: "string" });
        table.add_type(TypeKind::Primitive { name: "number" });
        table.add_type(TypeKind::Primitive { name: "boolean" });
        table.add_type(TypeKind::Primitive { name: "void" });
        table.add_type(TypeKind::Primitive { name: "null" });
        table.add_type(TypeKind::Primitive { name: "undefined" });
        table.add_type(TypeKind::Unknown);

        table
    }

    pub fn names(&self) -> &NameTable {
        &self.names
    }

    #[inline]
    pub fn intern(&self, name: &str) -> Name {
        self.names.intern(name)
    }

    /// Look up a primitive type (or `unknown`) by keyword.
    pub fn primitive(&self, name: &str) -> Option<TypeId> {
        match name {
            "string" => Some(self.string_type),
            "number" => Some(self.number_type),
            "boolean" => Some(self.boolean_type),
            "void" => Some(self.void_type),
            "null" => Some(self.null_type),
            "undefined" => Some(self.undefined_type),
            "unknown" => Some(self.unknown_type),
            _ => None,
        }
    }

    /// Add a new type to the table and return its ID.
    pub(crate) fn add_type(&mut self, kind: TypeKind) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(Type {
            id,
            flags: kind.flags(),
            kind,
        });
        id
    }

    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id.index()]
    }

    #[inline]
    pub fn flags(&self, id: TypeId) -> TypeFlags {
        self.get(id).flags
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    // ========================================================================
    // Construction
    // ========================================================================

    /// Create an anonymous object type. Fails if a property name repeats.
    pub fn make_object_type(
        &mut self,
        properties: impl IntoIterator<Item = (Name, Property)>,
    ) -> Result<TypeId, ConstructionError> {
        let object = ObjectType::new(None, properties, &self.names)?;
        Ok(self.add_type(TypeKind::Object(object)))
    }

    pub fn make_function_type(&mut self, function: FunctionType) -> TypeId {
        self.add_type(TypeKind::Function(function))
    }

    /// Create a fresh type parameter. Every call yields a distinct parameter,
    /// even for equal names.
    pub fn make_type_parameter(&mut self, name: Name) -> TypeId {
        self.add_type(TypeKind::TypeParameter(TypeParameter { name, constraint: None }))
    }

    /// Attach a constraint to a type parameter while its declaration is
    /// being built. Constraints may mention sibling parameters, so they can
    /// only be resolved after every parameter of the list exists.
    pub(crate) fn set_constraint(&mut self, parameter: TypeId, constraint: TypeId) {
        if let TypeKind::TypeParameter(ref mut p) = self.types[parameter.index()].kind {
            p.constraint = Some(constraint);
        }
    }

    /// Reserve an id for a declaration that may be referenced before its
    /// body is built.
    pub fn reserve(&mut self) -> TypeId {
        self.add_type(TypeKind::Pending)
    }

    /// Fill a reserved id. Each reservation is filled at most once.
    pub fn define(&mut self, id: TypeId, kind: TypeKind) -> Result<(), ConstructionError> {
        let slot = &mut self.types[id.index()];
        if slot.kind != TypeKind::Pending {
            return Err(ConstructionError::AlreadyDefined(id));
        }
        slot.flags = kind.flags();
        slot.kind = kind;
        Ok(())
    }

    pub fn make_generic(&mut self, name: Name, type_parameters: Vec<TypeId>, body: TypeId) -> TypeId {
        self.add_type(TypeKind::Generic(GenericType {
            name,
            type_parameters,
            body,
        }))
    }

    /// Create `origin<...>`. The bindings must name exactly the origin's
    /// type parameters; they are stored in the origin's declaration order.
    pub fn make_instantiated(
        &mut self,
        origin: TypeId,
        bindings: impl IntoIterator<Item = (Name, TypeId)>,
    ) -> Result<TypeId, ConstructionError> {
        let TypeKind::Generic(generic) = &self.get(origin).kind else {
            return Err(ConstructionError::NotGeneric(origin));
        };
        let origin_name = self.names.resolve(generic.name).to_string();
        let declared: Vec<Name> = generic
            .type_parameters
            .iter()
            .map(|&p| self.type_parameter_name(p))
            .collect();

        let supplied: FxHashMap<Name, TypeId> = bindings.into_iter().collect();
        if supplied.len() != declared.len() {
            return Err(ConstructionError::BindingCount {
                origin: origin_name,
                expected: declared.len(),
                found: supplied.len(),
            });
        }

        let mut ordered = IndexMap::with_capacity(declared.len());
        for &name in &declared {
            match supplied.get(&name) {
                Some(&ty) => {
                    ordered.insert(name, ty);
                }
                None => {
                    let stray = supplied
                        .keys()
                        .find(|k| !declared.contains(k))
                        .map(|k| self.names.resolve(*k).to_string())
                        .unwrap_or_default();
                    return Err(ConstructionError::UnknownBinding {
                        origin: origin_name,
                        name: stray,
                    });
                }
            }
        }

        Ok(self.add_type(TypeKind::Instantiated(InstantiatedType {
            origin,
            bindings: ordered,
        })))
    }

    fn type_parameter_name(&self, id: TypeId) -> Name {
        match &self.get(id).kind {
            TypeKind::TypeParameter(p) => p.name,
            _ => self.names.intern_static("?"),
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn as_function(&self, id: TypeId) -> Option<&FunctionType> {
        match &self.get(id).kind {
            TypeKind::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_object(&self, id: TypeId) -> Option<&ObjectType> {
        match &self.get(id).kind {
            TypeKind::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn is_primitive(&self, id: TypeId, name: &str) -> bool {
        matches!(self.get(id).kind, TypeKind::Primitive { name: n } if n == name)
    }

    /// Structural equality.
    pub fn equals(&self, a: TypeId, b: TypeId) -> bool {
        self.equals_inner(a, b, &mut Vec::new())
    }

    fn equals_inner(&self, a: TypeId, b: TypeId, assumed: &mut Vec<(TypeId, TypeId)>) -> bool {
        if a == b || assumed.contains(&(a, b)) {
            return true;
        }
        match (&self.get(a).kind, &self.get(b).kind) {
            (TypeKind::Primitive { name: x }, TypeKind::Primitive { name: y }) => x == y,
            (TypeKind::Unknown, TypeKind::Unknown) => true,
            (TypeKind::Object(x), TypeKind::Object(y)) => {
                if x.properties.len() != y.properties.len() {
                    return false;
                }
                assumed.push((a, b));
                let equal = x.properties.iter().all(|(name, p)| {
                    y.properties.get(name).is_some_and(|q| {
                        p.optional == q.optional && self.equals_inner(p.type_id, q.type_id, assumed)
                    })
                });
                assumed.pop();
                equal
            }
            (TypeKind::Function(x), TypeKind::Function(y)) => {
                if x.type_parameters.len() != y.type_parameters.len()
                    || x.parameters.len() != y.parameters.len()
                {
                    return false;
                }
                // Type parameters of the two signatures correspond by position.
                let mark = assumed.len();
                assumed.push((a, b));
                assumed.extend(x.type_parameters.iter().copied().zip(y.type_parameters.iter().copied()));
                let equal = x.parameters.iter().zip(&y.parameters).all(|(p, q)| {
                    p.optional == q.optional && self.equals_inner(p.type_id, q.type_id, assumed)
                }) && self.equals_inner(x.return_type, y.return_type, assumed);
                assumed.truncate(mark);
                equal
            }
            (TypeKind::Instantiated(x), TypeKind::Instantiated(y)) if x.origin == y.origin => x
                .bindings
                .values()
                .zip(y.bindings.values())
                .all(|(&p, &q)| self.equals_inner(p, q, assumed)),
            (TypeKind::Instantiated(_), _) | (_, TypeKind::Instantiated(_)) => {
                match (self.resolved_instantiation(a), self.resolved_instantiation(b)) {
                    (Some(ra), Some(rb)) if (ra, rb) != (a, b) => self.equals_inner(ra, rb, assumed),
                    _ => false,
                }
            }
            _ => false,
        }
    }

    /// The cached object body of an instantiated type, or the type itself
    /// for anything that is not an instantiation.
    fn resolved_instantiation(&self, id: TypeId) -> Option<TypeId> {
        match &self.get(id).kind {
            TypeKind::Instantiated(inst) => {
                let key = (inst.origin, inst.bindings.values().copied().collect::<Vec<_>>());
                self.instantiations.get(&key).copied()
            }
            _ => Some(id),
        }
    }

    // ========================================================================
    // Display
    // ========================================================================

    pub fn type_to_string(&self, id: TypeId) -> String {
        self.type_to_string_inner(id, 0)
    }

    fn type_to_string_inner(&self, id: TypeId, depth: u32) -> String {
        if depth > MAX_TYPE_TO_STRING_DEPTH {
            return "...".to_string();
        }
        match &self.get(id).kind {
            TypeKind::Primitive { name } => name.to_string(),
            TypeKind::Unknown | TypeKind::Pending => "unknown".to_string(),
            TypeKind::TypeParameter(p) => self.names.resolve(p.name).to_string(),
            TypeKind::Object(o) => {
                if let Some(name) = o.name {
                    return self.names.resolve(name).to_string();
                }
                if o.properties.is_empty() {
                    return "{}".to_string();
                }
                let members: Vec<String> = o
                    .properties
                    .iter()
                    .map(|(name, p)| {
                        format!(
                            "{}{}: {};",
                            self.names.resolve(*name),
                            if p.optional { "?" } else { "" },
                            self.type_to_string_inner(p.type_id, depth + 1)
                        )
                    })
                    .collect();
                format!("{{ {} }}", members.join(" "))
            }
            TypeKind::Function(f) => {
                let mut out = String::new();
                if f.is_generic() {
                    let params: Vec<String> = f
                        .type_parameters
                        .iter()
                        .map(|&p| self.type_parameter_to_string(p, depth))
                        .collect();
                    out.push_str(&format!("<{}>", params.join(", ")));
                }
                let params: Vec<String> = f
                    .parameters
                    .iter()
                    .map(|p| {
                        format!(
                            "{}{}: {}",
                            self.names.resolve(p.name),
                            if p.optional { "?" } else { "" },
                            self.type_to_string_inner(p.type_id, depth + 1)
                        )
                    })
                    .collect();
                out.push_str(&format!(
                    "({}) => {}",
                    params.join(", "),
                    self.type_to_string_inner(f.return_type, depth + 1)
                ));
                out
            }
            TypeKind::Generic(g) => self.names.resolve(g.name).to_string(),
            TypeKind::Instantiated(inst) => {
                let args: Vec<String> = inst
                    .bindings
                    .values()
                    .map(|&t| self.type_to_string_inner(t, depth + 1))
                    .collect();
                format!("{}<{}>", self.type_to_string_inner(inst.origin, depth + 1), args.join(", "))
            }
        }
    }

    fn type_parameter_to_string(&self, id: TypeId, depth: u32) -> String {
        match &self.get(id).kind {
            TypeKind::TypeParameter(TypeParameter {
                name,
                constraint: Some(c),
            }) => format!(
                "{} extends {}",
                self.names.resolve(*name),
                self.type_to_string_inner(*c, depth + 1)
            ),
            _ => self.type_to_string_inner(id, depth + 1),
        }
    }
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::new(NameTable::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(table: &mut TypeTable, props: &[(&str, TypeId, bool)]) -> TypeId {
        let props: Vec<(Name, Property)> = props
            .iter()
            .map(|&(n, t, optional)| (table.intern(n), Property { type_id: t, optional }))
            .collect();
        table.make_object_type(props).unwrap()
    }

    fn function(table: &mut TypeTable, params: &[TypeId], ret: TypeId) -> TypeId {
        let parameters = params
            .iter()
            .enumerate()
            .map(|(i, &t)| Parameter {
                name: table.intern(&format!("p{}", i)),
                type_id: t,
                optional: false,
            })
            .collect();
        table.make_function_type(FunctionType {
            type_parameters: vec![],
            parameters,
            return_type: ret,
        })
    }

    #[test]
    fn test_well_known_types() {
        let table = TypeTable::default();
        assert_eq!(table.primitive("string"), Some(table.string_type));
        assert_eq!(table.primitive("unknown"), Some(table.unknown_type));
        assert_eq!(table.primitive("symbol"), None);
        assert!(table.flags(table.number_type).contains(TypeFlags::PRIMITIVE));
        assert!(table.flags(table.unknown_type).intersects(TypeFlags::WILDCARD));
    }

    #[test]
    fn test_duplicate_property_rejected() {
        let mut table = TypeTable::default();
        let tag = table.intern("tag");
        let s = table.string_type;
        let err = table
            .make_object_type([(tag, Property::required(s)), (tag, Property::required(s))])
            .unwrap_err();
        assert_eq!(err, ConstructionError::DuplicateProperty("tag".into()));
    }

    #[test]
    fn test_object_equality_is_structural() {
        let mut table = TypeTable::default();
        let (s, n) = (table.string_type, table.number_type);
        let a = object(&mut table, &[("tag", s, false), ("value", n, true)]);
        let b = object(&mut table, &[("value", n, true), ("tag", s, false)]);
        let c = object(&mut table, &[("tag", s, false), ("value", n, false)]);
        let d = object(&mut table, &[("tag", s, false)]);
        assert_ne!(a, b);
        assert!(table.equals(a, b));
        assert!(!table.equals(a, c), "optionality participates in equality");
        assert!(!table.equals(a, d));
    }

    #[test]
    fn test_function_equality() {
        let mut table = TypeTable::default();
        let (s, n) = (table.string_type, table.number_type);
        let f = function(&mut table, &[n, s], n);
        let g = function(&mut table, &[n, s], n);
        let h = function(&mut table, &[s, n], n);
        let k = function(&mut table, &[n, s], s);
        assert!(table.equals(f, g));
        assert!(!table.equals(f, h));
        assert!(!table.equals(f, k));
    }

    #[test]
    fn test_generic_functions_equal_up_to_renaming() {
        let mut table = TypeTable::default();
        let t_name = table.intern("T");
        let u_name = table.intern("U");
        let t = table.make_type_parameter(t_name);
        let u = table.make_type_parameter(u_name);
        let x = table.intern("x");
        let identity_t = table.make_function_type(FunctionType {
            type_parameters: vec![t],
            parameters: vec![Parameter { name: x, type_id: t, optional: false }],
            return_type: t,
        });
        let identity_u = table.make_function_type(FunctionType {
            type_parameters: vec![u],
            parameters: vec![Parameter { name: x, type_id: u, optional: false }],
            return_type: u,
        });
        assert!(table.equals(identity_t, identity_u));
        assert!(!table.equals(t, u), "distinct declarations are distinct parameters");
    }

    #[test]
    fn test_recursive_object_equality_terminates() {
        let mut table = TypeTable::default();
        let next = table.intern("next");
        let a = table.reserve();
        let b = table.reserve();
        let body_a = ObjectType::new(None, [(next, Property::required(a))], table.names()).unwrap();
        let body_b = ObjectType::new(None, [(next, Property::required(b))], table.names()).unwrap();
        table.define(a, TypeKind::Object(body_a)).unwrap();
        table.define(b, TypeKind::Object(body_b)).unwrap();
        assert!(table.equals(a, b));
    }

    #[test]
    fn test_define_only_once() {
        let mut table = TypeTable::default();
        let id = table.reserve();
        assert!(table.flags(id).contains(TypeFlags::PENDING));
        table.define(id, TypeKind::Unknown).unwrap();
        assert_eq!(table.define(id, TypeKind::Unknown), Err(ConstructionError::AlreadyDefined(id)));
    }

    #[test]
    fn test_instantiated_bindings_must_cover_parameters() {
        let mut table = TypeTable::default();
        let t_name = table.intern("T");
        let t = table.make_type_parameter(t_name);
        let body = object(&mut table, &[("value", t, false)]);
        let boxed = table.intern("Box");
        let origin = table.make_generic(boxed, vec![t], body);
        let s = table.string_type;

        let ok = table.make_instantiated(origin, [(t_name, s)]).unwrap();
        assert_eq!(table.type_to_string(ok), "Box<string>");

        let k = table.intern("K");
        assert!(matches!(
            table.make_instantiated(origin, Vec::<(Name, TypeId)>::new()),
            Err(ConstructionError::BindingCount { expected: 1, found: 0, .. })
        ));
        assert!(matches!(
            table.make_instantiated(origin, [(k, s)]),
            Err(ConstructionError::UnknownBinding { .. })
        ));
        assert!(matches!(
            table.make_instantiated(origin, [(t_name, s), (k, s)]),
            Err(ConstructionError::BindingCount { expected: 1, found: 2, .. })
        ));
        assert_eq!(
            table.make_instantiated(body, Vec::<(Name, TypeId)>::new()),
            Err(ConstructionError::NotGeneric(body))
        );
    }

    #[test]
    fn test_type_to_string() {
        let mut table = TypeTable::default();
        let (s, n) = (table.string_type, table.number_type);
        let obj = object(&mut table, &[("tag", s, false), ("value", n, true)]);
        assert_eq!(table.type_to_string(obj), "{ tag: string; value?: number; }");
        let empty = object(&mut table, &[]);
        assert_eq!(table.type_to_string(empty), "{}");
        let f = function(&mut table, &[n], n);
        assert_eq!(table.type_to_string(f), "(p0: number) => number");

        let k_name = table.intern("K");
        let k = table.make_type_parameter(k_name);
        table.set_constraint(k, s);
        let y = table.intern("y");
        let generic = table.make_function_type(FunctionType {
            type_parameters: vec![k],
            parameters: vec![Parameter { name: y, type_id: k, optional: true }],
            return_type: n,
        });
        assert_eq!(table.type_to_string(generic), "<K extends string>(y?: K) => number");
    }

    #[test]
    fn test_min_argument_count() {
        let mut table = TypeTable::default();
        let n = table.number_type;
        let a = table.intern("a");
        let b = table.intern("b");
        let f = FunctionType {
            type_parameters: vec![],
            parameters: vec![
                Parameter { name: a, type_id: n, optional: false },
                Parameter { name: b, type_id: n, optional: true },
            ],
            return_type: n,
        };
        assert_eq!(f.min_argument_count(), 1);
        assert_eq!(FunctionType { parameters: vec![], ..f }.min_argument_count(), 0);
    }
}
