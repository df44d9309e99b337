use crate::runtime::value::Value;
use crate::types::descriptor::TypeDesc;

/// Fits a script value to a declared type, or explains why it cannot.
///
/// Errors carry the bare message; callers attach the source location
/// and the parameter or property context.
pub fn coerce(value: Value, target: &TypeDesc) -> Result<Value, String> {
    if value.is_void() {
        return Err("Cannot access a void value.".to_string());
    }

    match target {
        TypeDesc::Any => Ok(fold_words(value)),

        TypeDesc::Str => match value {
            Value::Str(_) => Ok(value),
            Value::Word(w) => Ok(Value::Str(w)),
            other => Err(mismatch(target, &other)),
        },

        TypeDesc::Int => match value {
            Value::Int(_) => Ok(value),
            other => Err(mismatch(target, &other)),
        },

        TypeDesc::Float => match value {
            Value::Float(_) => Ok(value),
            Value::Int(v) => Ok(Value::Float(v as f64)),
            other => Err(mismatch(target, &other)),
        },

        // only the bare words true/false, never quoted strings
        TypeDesc::Bool => match value {
            Value::Bool(_) => Ok(value),
            Value::Word(w) if w == "true" => Ok(Value::Bool(true)),
            Value::Word(w) if w == "false" => Ok(Value::Bool(false)),
            other => Err(mismatch(target, &other)),
        },

        TypeDesc::Enum(desc) => match value.as_str() {
            Some(s) if desc.members.iter().any(|m| m == s) => Ok(Value::Str(s.to_string())),
            _ => Err(mismatch(target, &value)),
        },

        TypeDesc::Nullable(inner) => {
            if value.is_null() {
                Ok(Value::Null)
            } else {
                coerce(value, inner)
            }
        }

        TypeDesc::Tuple(fields) => match value {
            Value::List(items) if items.len() == fields.len() => {
                let mut out = Vec::with_capacity(items.len());
                for (item, field) in items.into_iter().zip(fields) {
                    out.push(coerce(item, &field.ty)?);
                }
                Ok(Value::List(out))
            }
            other => Err(mismatch(target, &other)),
        },

        TypeDesc::Array(element) => match value {
            Value::List(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(coerce(item, element)?);
                }
                Ok(Value::List(out))
            }
            other => Err(mismatch(target, &other)),
        },
    }
}

fn mismatch(target: &TypeDesc, value: &Value) -> String {
    format!("Invalid value for {}: {}", target.name(), value)
}

/// Bare words carried into an `Any` slot become plain strings.
fn fold_words(value: Value) -> Value {
    match value {
        Value::Word(w) => Value::Str(w),
        Value::List(items) => Value::List(items.into_iter().map(fold_words).collect()),
        other => other,
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
