//! Host type knowledge, the declared types of a grammar description plus
//! whatever can be read off Rust type syntax.

use std::{
    collections::{HashMap, HashSet},
    fmt::Display,
    hash::Hash,
    rc::Rc,
};

use quote::ToTokens;

use crate::{
    description::{GrammarFile, TypeDecl, TypeKind},
    error::{Code, DiagnosticAccumulator, Location},
};

/// A parsed Rust type, compared by its token representation.
#[derive(Clone)]
pub struct TypeRef {
    key: Rc<str>,
    ty: Rc<syn::Type>,
}

impl TypeRef {
    pub fn parse(src: &str) -> Result<TypeRef, syn::Error> {
        let ty = syn::parse_str::<syn::Type>(src)?;
        Ok(TypeRef::from_syn(ty))
    }

    pub fn from_syn(ty: syn::Type) -> TypeRef {
        TypeRef {
            key: ty.to_token_stream().to_string().into(),
            ty: Rc::new(ty),
        }
    }

    /// Token representation, this is what gets pasted into generated code.
    pub fn as_str(&self) -> &str {
        &self.key
    }

    pub fn syn(&self) -> &syn::Type {
        &self.ty
    }

    /// The single identifier of a plain path type such as `Node`.
    pub fn as_ident(&self) -> Option<String> {
        match &*self.ty {
            syn::Type::Path(path) if path.qself.is_none() => {
                path.path.get_ident().map(|ident| ident.to_string())
            }
            _ => None,
        }
    }

    fn last_segment(&self) -> Option<&syn::PathSegment> {
        match strip_parens(&self.ty) {
            syn::Type::Path(path) if path.qself.is_none() => path.path.segments.last(),
            _ => None,
        }
    }

    /// Name of the outermost type constructor, `Vec` for `std::vec::Vec<u8>`.
    pub fn head(&self) -> Option<String> {
        self.last_segment().map(|segment| segment.ident.to_string())
    }

    /// Type arguments of the outermost type constructor, lifetimes are skipped.
    pub fn type_args(&self) -> Vec<TypeRef> {
        let Some(segment) = self.last_segment() else {
            return Vec::new();
        };
        match &segment.arguments {
            syn::PathArguments::AngleBracketed(args) => args
                .args
                .iter()
                .filter_map(|arg| match arg {
                    syn::GenericArgument::Type(ty) => Some(TypeRef::from_syn(ty.clone())),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Elements of a tuple type, `None` for anything else.
    pub fn tuple_elems(&self) -> Option<Vec<TypeRef>> {
        match strip_parens(&self.ty) {
            syn::Type::Tuple(tuple) => Some(
                tuple
                    .elems
                    .iter()
                    .map(|ty| TypeRef::from_syn(ty.clone()))
                    .collect(),
            ),
            _ => None,
        }
    }
}

fn strip_parens(ty: &syn::Type) -> &syn::Type {
    match ty {
        syn::Type::Paren(inner) => strip_parens(&inner.elem),
        syn::Type::Group(inner) => strip_parens(&inner.elem),
        _ => ty,
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for TypeRef {}

impl Hash for TypeRef {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl std::fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TypeRef({self})")
    }
}

impl Display for TypeRef {
    /// Prints the type the way a person would write it, `Vec<(u32, String)>`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut out = String::with_capacity(self.key.len());
        for token in self.key.split(' ') {
            let glue = matches!(token, "<" | ">" | "," | "::" | ")" | "]")
                || out.ends_with(['<', '(', '[', '&', ','])
                || out.ends_with("::");
            if !out.is_empty() && !glue {
                out.push(' ');
            }
            out.push_str(token);
        }
        f.write_str(&out.replace(",", ", "))
    }
}

/// What a parameter type means to the generator.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Classified {
    DecodedString,
    RawToken,
    /// Map-like types are opaque values, never decomposed into lists.
    Map,
    List(TypeRef),
    Optional(TypeRef),
    Tuple(Vec<TypeRef>),
    Unit,
    Named,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Constructor {
    pub path: String,
    pub params: Vec<TypeRef>,
}

/// The queries the generator asks of the host type system.
pub trait TypeSystem {
    fn classify(&self, ty: &TypeRef) -> Classified;
    /// Constructors of `ty` taking `arity` parameters, excluding the
    /// zero-arity and the self-copy constructors.
    fn constructors(&self, ty: &TypeRef, arity: usize) -> Vec<Constructor>;
    /// Whether `sub` has `sup` among its (transitive) base types.
    fn is_subtype(&self, sub: &TypeRef, sup: &TypeRef) -> bool;
    fn is_enum(&self, ty: &TypeRef) -> bool;
}

#[derive(Clone, Debug)]
struct DeclaredType {
    kind: TypeKind,
    base: Option<TypeRef>,
    list_of: Option<TypeRef>,
    map: bool,
    constructors: Vec<Constructor>,
}

#[derive(Default, Debug)]
pub struct Registry {
    types: HashMap<TypeRef, DeclaredType>,
}

const MAP_TYPES: &[&str] = &["HashMap", "BTreeMap", "IndexMap"];
const LIST_TYPES: &[&str] = &["Vec", "VecDeque", "LinkedList", "HashSet", "BTreeSet"];

impl Registry {
    pub fn new() -> Registry {
        Self::default()
    }

    /// Declares the types of `file`, lexer token types are declared as enums.
    pub fn from_description(file: &GrammarFile, err: &DiagnosticAccumulator) -> Registry {
        let mut registry = Registry::new();

        for lexer in &file.lexers {
            match TypeRef::parse(&lexer.token_type) {
                Ok(ty) => registry.declare_enum(ty),
                Err(e) => err.push(
                    Code::InvalidType,
                    Location::new(format!("lexer {}", lexer.token_type)),
                    format!("`{}` is not a valid type: {e}", lexer.token_type),
                ),
            }
        }

        for decl in &file.types {
            let location = Location::new(format!("type {}", decl.name));
            match registry.declare_from(decl) {
                Ok(()) => {}
                Err((src, e)) => err.push(
                    Code::InvalidType,
                    location,
                    format!("`{src}` is not a valid type: {e}"),
                ),
            }
        }

        registry
    }

    fn declare_from(&mut self, decl: &TypeDecl) -> Result<(), (String, syn::Error)> {
        let parse = |src: &str| TypeRef::parse(src).map_err(|e| (src.to_owned(), e));

        let ty = parse(&decl.name)?;
        let base = decl.base.as_deref().map(parse).transpose()?;
        let list_of = decl.list_of.as_deref().map(parse).transpose()?;
        let constructors = decl
            .constructors
            .iter()
            .map(|c| {
                let params = c
                    .params
                    .iter()
                    .map(|p| parse(p))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Constructor {
                    path: c.path.clone(),
                    params,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.declare(
            ty,
            decl.kind,
            base,
            list_of,
            decl.map,
            constructors,
        );
        Ok(())
    }

    pub fn declare(
        &mut self,
        ty: TypeRef,
        kind: TypeKind,
        base: Option<TypeRef>,
        list_of: Option<TypeRef>,
        map: bool,
        constructors: Vec<Constructor>,
    ) {
        let declared = DeclaredType {
            kind,
            base,
            list_of,
            map,
            constructors,
        };
        self.types.insert(ty, declared);
    }

    pub fn declare_enum(&mut self, ty: TypeRef) {
        self.types.entry(ty).or_insert(DeclaredType {
            kind: TypeKind::Enum,
            base: None,
            list_of: None,
            map: false,
            constructors: Vec::new(),
        });
    }

    pub fn is_declared(&self, ty: &TypeRef) -> bool {
        self.types.contains_key(ty)
    }

    /// `ty` followed by its base types, stops on cycles.
    pub fn base_chain(&self, ty: &TypeRef) -> Vec<TypeRef> {
        let mut chain = vec![ty.clone()];
        let mut seen = HashSet::from([ty.clone()]);
        let mut current = ty;
        while let Some(base) = self.types.get(current).and_then(|d| d.base.as_ref()) {
            if !seen.insert(base.clone()) {
                break;
            }
            chain.push(base.clone());
            current = base;
        }
        chain
    }
}

impl TypeSystem for Registry {
    fn classify(&self, ty: &TypeRef) -> Classified {
        if let Some(elems) = ty.tuple_elems() {
            return match elems.is_empty() {
                true => Classified::Unit,
                false => Classified::Tuple(elems),
            };
        }

        let Some(head) = ty.head() else {
            return Classified::Named;
        };
        let args = ty.type_args();
        let declared = self.types.get(ty);

        if head == "String" && args.is_empty() {
            return Classified::DecodedString;
        }
        if head == "Token" && args.is_empty() {
            return Classified::RawToken;
        }
        if declared.is_some_and(|d| d.map) || MAP_TYPES.contains(&head.as_str()) {
            return Classified::Map;
        }
        if let Some(item) = declared.and_then(|d| d.list_of.clone()) {
            return Classified::List(item);
        }
        if let ([item], true) = (args.as_slice(), LIST_TYPES.contains(&head.as_str())) {
            return Classified::List(item.clone());
        }
        if let ([inner], "Option") = (args.as_slice(), head.as_str()) {
            return Classified::Optional(inner.clone());
        }

        Classified::Named
    }

    fn constructors(&self, ty: &TypeRef, arity: usize) -> Vec<Constructor> {
        let Some(declared) = self.types.get(ty) else {
            return Vec::new();
        };
        declared
            .constructors
            .iter()
            .filter(|c| c.params.len() == arity)
            .filter(|c| !c.params.is_empty())
            .filter(|c| !(c.params.len() == 1 && &c.params[0] == ty))
            .cloned()
            .collect()
    }

    fn is_subtype(&self, sub: &TypeRef, sup: &TypeRef) -> bool {
        sub != sup && self.base_chain(sub).contains(sup)
    }

    fn is_enum(&self, ty: &TypeRef) -> bool {
        self.types
            .get(ty)
            .is_some_and(|d| d.kind == TypeKind::Enum)
    }
}
