use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
}

impl BaseType {
    pub fn from_descriptor_char(c: char) -> Option<Self> {
        Some(match c {
            'B' => BaseType::Byte,
            'C' => BaseType::Char,
            'D' => BaseType::Double,
            'F' => BaseType::Float,
            'I' => BaseType::Int,
            'J' => BaseType::Long,
            'S' => BaseType::Short,
            'Z' => BaseType::Boolean,
            _ => return None,
        })
    }

    /// The Java keyword for this primitive (`int`, `boolean`, ...).
    pub fn keyword(self) -> &'static str {
        match self {
            BaseType::Byte => "byte",
            BaseType::Char => "char",
            BaseType::Double => "double",
            BaseType::Float => "float",
            BaseType::Int => "int",
            BaseType::Long => "long",
            BaseType::Short => "short",
            BaseType::Boolean => "boolean",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Base(BaseType),
    /// Internal class name (`java/lang/String`).
    Object(String),
    Array(Box<FieldType>),
}

impl FieldType {
    /// Number of array dimensions wrapping the element type.
    pub fn dimensions(&self) -> usize {
        match self {
            FieldType::Array(inner) => 1 + inner.dimensions(),
            _ => 0,
        }
    }

    /// The non-array element type.
    pub fn element(&self) -> &FieldType {
        match self {
            FieldType::Array(inner) => inner.element(),
            other => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnType {
    Void,
    Type(FieldType),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub params: Vec<FieldType>,
    pub return_type: ReturnType,
}

pub fn parse_field_descriptor(desc: &str) -> Result<FieldType> {
    let (ty, rest) = parse_field_type(desc)?;
    if !rest.is_empty() {
        return Err(Error::InvalidDescriptor(desc.to_string()));
    }
    Ok(ty)
}

pub fn parse_method_descriptor(desc: &str) -> Result<MethodDescriptor> {
    let Some(mut rest) = desc.strip_prefix('(') else {
        return Err(Error::InvalidDescriptor(desc.to_string()));
    };

    let mut params = Vec::new();
    loop {
        if let Some(after) = rest.strip_prefix(')') {
            rest = after;
            break;
        }
        if rest.is_empty() {
            return Err(Error::InvalidDescriptor(desc.to_string()));
        }
        let (param, after) = parse_field_type(rest)?;
        params.push(param);
        rest = after;
    }

    let (return_type, rest) = if let Some(after) = rest.strip_prefix('V') {
        (ReturnType::Void, after)
    } else {
        let (ty, after) = parse_field_type(rest)?;
        (ReturnType::Type(ty), after)
    };

    if !rest.is_empty() {
        return Err(Error::InvalidDescriptor(desc.to_string()));
    }

    Ok(MethodDescriptor {
        params,
        return_type,
    })
}

fn parse_field_type(input: &str) -> Result<(FieldType, &str)> {
    let Some(first) = input.chars().next() else {
        return Err(Error::InvalidDescriptor(input.to_string()));
    };

    if let Some(base) = BaseType::from_descriptor_char(first) {
        return Ok((FieldType::Base(base), &input[1..]));
    }

    match first {
        'L' => match input.find(';') {
            Some(end) if end > 1 => Ok((FieldType::Object(input[1..end].to_string()), &input[end + 1..])),
            _ => Err(Error::InvalidDescriptor(input.to_string())),
        },
        '[' => {
            let (component, rest) = parse_field_type(&input[1..])?;
            Ok((FieldType::Array(Box::new(component)), rest))
        }
        _ => Err(Error::InvalidDescriptor(input.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_field_descriptor_primitives_and_arrays() {
        assert_eq!(parse_field_descriptor("I").unwrap(), FieldType::Base(BaseType::Int));
        let nested = parse_field_descriptor("[[Ljava/lang/String;").unwrap();
        assert_eq!(nested.dimensions(), 2);
        assert_eq!(
            nested.element(),
            &FieldType::Object("java/lang/String".to_string())
        );
    }

    #[test]
    fn parse_method_descriptor_with_varargs_array() {
        let desc = parse_method_descriptor("(I[Ljava/lang/Object;)V").unwrap();
        assert_eq!(desc.params.len(), 2);
        assert_eq!(desc.params[1].dimensions(), 1);
        assert_eq!(desc.return_type, ReturnType::Void);
    }

    #[test]
    fn rejects_truncated_descriptors() {
        assert!(parse_method_descriptor("(I").is_err());
        assert!(parse_field_descriptor("L;").is_err());
        assert!(parse_field_descriptor("Q").is_err());
    }
}
