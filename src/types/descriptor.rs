use crate::syntax::token::is_identifier;

/// Declared shape of a parameter or property value.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDesc {
    Any,     // any non-void value, passed through unchanged
    Str,
    Int,
    Float,   // also accepts integers
    Bool,
    Enum(EnumDesc),
    Nullable(Box<TypeDesc>),
    Tuple(Vec<TupleField>),
    Array(Box<TypeDesc>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDesc {
    pub name: String,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TupleField {
    pub name: Option<String>,
    pub ty: TypeDesc,
}

impl TupleField {
    pub fn new(ty: TypeDesc) -> Self {
        Self { name: None, ty }
    }

    pub fn named(name: impl Into<String>, ty: TypeDesc) -> Self {
        Self { name: Some(name.into()), ty }
    }
}

impl TypeDesc {
    pub fn enumeration(name: impl Into<String>, members: &[&str]) -> Self {
        TypeDesc::Enum(EnumDesc {
            name: name.into(),
            members: members.iter().map(|m| m.to_string()).collect(),
        })
    }

    pub fn nullable(inner: TypeDesc) -> Self {
        TypeDesc::Nullable(Box::new(inner))
    }

    pub fn tuple(fields: impl Into<Vec<TupleField>>) -> Self {
        TypeDesc::Tuple(fields.into())
    }

    pub fn array(element: TypeDesc) -> Self {
        TypeDesc::Array(Box::new(element))
    }

    /// Human name used in coercion diagnostics.
    pub fn name(&self) -> String {
        match self {
            TypeDesc::Any => "anything".to_string(),
            TypeDesc::Str => "string".to_string(),
            TypeDesc::Int => "integer".to_string(),
            TypeDesc::Float => "floating-point number".to_string(),
            TypeDesc::Bool => "boolean".to_string(),
            TypeDesc::Enum(desc) => format!("enumeration '{}'", desc.name),
            TypeDesc::Nullable(inner) => format!("nullable {}", inner.name()),
            TypeDesc::Tuple(fields) => tuple_name(fields),
            TypeDesc::Array(element) => format!("array of {}", element.name()),
        }
    }

    /// Checks the declaration itself is well formed, recursing into
    /// nested types. Called once at registration time.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            TypeDesc::Enum(desc) => {
                if !is_identifier(&desc.name) {
                    return Err(format!(
                        "enumeration name '{}' is not a valid identifier",
                        desc.name
                    ));
                }
                if desc.members.is_empty() {
                    return Err(format!("enumeration '{}' has no members", desc.name));
                }
                for (i, member) in desc.members.iter().enumerate() {
                    if !is_identifier(member) {
                        return Err(format!(
                            "enumeration '{}' member '{}' is not a valid identifier",
                            desc.name, member
                        ));
                    }
                    if desc.members[..i].contains(member) {
                        return Err(format!(
                            "enumeration '{}' repeats member '{}'",
                            desc.name, member
                        ));
                    }
                }
                Ok(())
            }
            TypeDesc::Tuple(fields) => {
                if fields.is_empty() {
                    return Err("tuple type has no fields".to_string());
                }
                for (i, field) in fields.iter().enumerate() {
                    if let Some(name) = &field.name {
                        if !is_identifier(name) {
                            return Err(format!(
                                "tuple field name '{name}' is not a valid identifier"
                            ));
                        }
                        if fields[..i].iter().any(|f| f.name.as_deref() == Some(name.as_str())) {
                            return Err(format!("tuple repeats field name '{name}'"));
                        }
                    }
                    field.ty.validate()?;
                }
                Ok(())
            }
            TypeDesc::Nullable(inner) => inner.validate(),
            TypeDesc::Array(element) => element.validate(),
            _ => Ok(()),
        }
    }
}

fn tuple_name(fields: &[TupleField]) -> String {
    let names: Vec<String> = fields.iter().map(|f| f.ty.name()).collect();
    match names.as_slice() {
        [] => "tuple".to_string(),
        [only] => format!("tuple of {only}"),
        [a, b] => format!("tuple of {a} and {b}"),
        [head @ .., last] => format!("tuple of {}, and {last}", head.join(", ")),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
