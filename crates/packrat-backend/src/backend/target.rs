use std::fmt::Display;

use super::registry::{Classified, TypeRef, TypeSystem};

/// The shape a construction target demands from a pattern.
///
/// Everything but `Empty` and `Pair` stands for one parameter or one nested
/// value and remembers the type it was classified from.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum RequiredShape {
    Empty,
    RawToken(TypeRef),
    DecodedString(TypeRef),
    TokenKind(TypeRef),
    Named(TypeRef),
    List {
        ty: TypeRef,
        item: Box<RequiredShape>,
    },
    Optional {
        ty: TypeRef,
        inner: Box<RequiredShape>,
    },
    /// Tuple types group several values into one parameter.
    Tuple {
        ty: TypeRef,
        items: Vec<RequiredShape>,
    },
    /// Consecutive parameters.
    Pair(Box<RequiredShape>, Box<RequiredShape>),
}

impl RequiredShape {
    /// Folds parameter shapes into a right-nested `Pair` chain.
    pub fn fold(mut shapes: Vec<RequiredShape>) -> RequiredShape {
        let Some(mut shape) = shapes.pop() else {
            return RequiredShape::Empty;
        };
        while let Some(previous) = shapes.pop() {
            shape = RequiredShape::Pair(Box::new(previous), Box::new(shape));
        }
        shape
    }

    pub fn from_params(
        params: &[TypeRef],
        token_type: &TypeRef,
        types: &dyn TypeSystem,
    ) -> RequiredShape {
        let shapes = params
            .iter()
            .map(|param| classify(param, token_type, types))
            .collect();
        RequiredShape::fold(shapes)
    }

    pub fn type_ref(&self) -> Option<&TypeRef> {
        match self {
            RequiredShape::Empty | RequiredShape::Pair(..) => None,
            RequiredShape::RawToken(ty)
            | RequiredShape::DecodedString(ty)
            | RequiredShape::TokenKind(ty)
            | RequiredShape::Named(ty)
            | RequiredShape::List { ty, .. }
            | RequiredShape::Optional { ty, .. }
            | RequiredShape::Tuple { ty, .. } => Some(ty),
        }
    }

    /// Number of values this shape stands for.
    pub fn width(&self) -> usize {
        match self {
            RequiredShape::Empty => 0,
            RequiredShape::Pair(a, b) => a.width() + b.width(),
            _ => 1,
        }
    }

    /// A list that is built as a `Vec` needs no conversion at the end.
    pub fn is_vec(&self) -> bool {
        match self {
            RequiredShape::List { ty, .. } => ty.head().as_deref() == Some("Vec"),
            _ => false,
        }
    }
}

impl Display for RequiredShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequiredShape::Empty => f.write_str("nothing"),
            RequiredShape::Pair(a, b) => write!(f, "{a}, {b}"),
            _ => match self.type_ref() {
                Some(ty) => write!(f, "`{ty}`"),
                None => Ok(()),
            },
        }
    }
}

/// Classifies a parameter type, first match wins: string, token kind enum,
/// raw token, map, list, tuple, option, anything else.
pub fn classify(ty: &TypeRef, token_type: &TypeRef, types: &dyn TypeSystem) -> RequiredShape {
    let classified = types.classify(ty);
    if classified == Classified::DecodedString {
        return RequiredShape::DecodedString(ty.clone());
    }
    if ty == token_type {
        return RequiredShape::TokenKind(ty.clone());
    }

    match classified {
        Classified::DecodedString => RequiredShape::DecodedString(ty.clone()),
        Classified::RawToken => RequiredShape::RawToken(ty.clone()),
        Classified::Map | Classified::Named => RequiredShape::Named(ty.clone()),
        Classified::List(item) => RequiredShape::List {
            ty: ty.clone(),
            item: Box::new(classify(&item, token_type, types)),
        },
        Classified::Optional(inner) => RequiredShape::Optional {
            ty: ty.clone(),
            inner: Box::new(classify(&inner, token_type, types)),
        },
        Classified::Tuple(items) => RequiredShape::Tuple {
            ty: ty.clone(),
            items: items
                .iter()
                .map(|item| classify(item, token_type, types))
                .collect(),
        },
        Classified::Unit => RequiredShape::Empty,
    }
}

/// How the value of an alternative is built.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum TargetKind {
    /// A `&self` method of the logic type.
    Function(String),
    /// A constructor function or tuple struct path.
    Constructor(String),
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Target {
    pub kind: TargetKind,
    pub params: Vec<TypeRef>,
    pub returns: TypeRef,
}

/// The type all of `returns` convert into, walking declared base types.
/// Fails with the first pair of unrelated types.
pub fn common_type(
    types: &dyn TypeSystem,
    returns: &[TypeRef],
) -> Result<Option<TypeRef>, (TypeRef, TypeRef)> {
    let Some((first, rest)) = returns.split_first() else {
        return Ok(None);
    };
    let mut current = first.clone();
    for ty in rest {
        if *ty == current || types.is_subtype(ty, &current) {
            continue;
        }
        if types.is_subtype(&current, ty) {
            current = ty.clone();
            continue;
        }
        return Err((current, ty.clone()));
    }
    Ok(Some(current))
}
