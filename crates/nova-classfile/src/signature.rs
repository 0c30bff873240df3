//! Generic signature parsing (JVMS 4.7.9.1).

use crate::descriptor::BaseType;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSignature {
    Base(BaseType),
    Class(ClassTypeSignature),
    TypeVariable(String),
    Array(Box<TypeSignature>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleClassTypeSignature {
    pub name: String,
    pub type_arguments: Vec<TypeArgument>,
}

/// `Ljava/util/Map<TK;TV;>.Entry<...>;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassTypeSignature {
    /// Package in internal form (`java/util`), empty for the unnamed package.
    pub package: String,
    /// Outermost class first.
    pub segments: Vec<SimpleClassTypeSignature>,
}

impl ClassTypeSignature {
    /// Binary name of the innermost class (`java.util.Map$Entry`).
    pub fn binary_name(&self) -> String {
        let mut out = self.package.replace('/', ".");
        if !out.is_empty() {
            out.push('.');
        }
        for (idx, seg) in self.segments.iter().enumerate() {
            if idx > 0 {
                out.push('$');
            }
            out.push_str(&seg.name);
        }
        out
    }

    /// Type arguments applied to the innermost class.
    pub fn type_arguments(&self) -> &[TypeArgument] {
        self.segments
            .last()
            .map(|seg| seg.type_arguments.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeArgument {
    /// `*`
    Any,
    Exact(TypeSignature),
    /// `+T`
    Extends(TypeSignature),
    /// `-T`
    Super(TypeSignature),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParameter {
    pub name: String,
    pub class_bound: Option<TypeSignature>,
    pub interface_bounds: Vec<TypeSignature>,
}

impl TypeParameter {
    /// All declared bounds, class bound first.
    pub fn bounds(&self) -> impl Iterator<Item = &TypeSignature> {
        self.class_bound.iter().chain(self.interface_bounds.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSignature {
    pub type_parameters: Vec<TypeParameter>,
    pub super_class: ClassTypeSignature,
    pub interfaces: Vec<ClassTypeSignature>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    pub type_parameters: Vec<TypeParameter>,
    pub parameters: Vec<TypeSignature>,
    /// `None` for `void`.
    pub return_type: Option<TypeSignature>,
    pub throws: Vec<TypeSignature>,
}

pub fn parse_class_signature(sig: &str) -> Result<ClassSignature> {
    let mut p = SigParser::new(sig);
    let type_parameters = p.type_parameters()?;
    let super_class = p.class_type()?;
    let mut interfaces = Vec::new();
    while !p.at_end() {
        interfaces.push(p.class_type()?);
    }
    Ok(ClassSignature {
        type_parameters,
        super_class,
        interfaces,
    })
}

pub fn parse_method_signature(sig: &str) -> Result<MethodSignature> {
    let mut p = SigParser::new(sig);
    let type_parameters = p.type_parameters()?;
    p.expect('(')?;
    let mut parameters = Vec::new();
    while p.peek() != Some(')') {
        parameters.push(p.java_type()?);
    }
    p.expect(')')?;
    let return_type = if p.eat('V') {
        None
    } else {
        Some(p.java_type()?)
    };
    let mut throws = Vec::new();
    while p.eat('^') {
        throws.push(p.reference_type()?);
    }
    p.finish()?;
    Ok(MethodSignature {
        type_parameters,
        parameters,
        return_type,
        throws,
    })
}

pub fn parse_field_signature(sig: &str) -> Result<TypeSignature> {
    let mut p = SigParser::new(sig);
    let ty = p.reference_type()?;
    p.finish()?;
    Ok(ty)
}

struct SigParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> SigParser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn error(&self) -> Error {
        Error::InvalidSignature(self.input.to_string())
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char) -> Result<()> {
        if self.eat(c) {
            Ok(())
        } else {
            Err(self.error())
        }
    }

    fn finish(&self) -> Result<()> {
        if self.at_end() {
            Ok(())
        } else {
            Err(self.error())
        }
    }

    fn identifier(&mut self) -> Result<&'a str> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if matches!(c, '.' | ';' | '[' | '/' | '<' | '>' | ':') {
                break;
            }
            self.pos += c.len_utf8();
        }
        if self.pos == start {
            return Err(self.error());
        }
        Ok(&self.input[start..self.pos])
    }

    fn type_parameters(&mut self) -> Result<Vec<TypeParameter>> {
        let mut out = Vec::new();
        if !self.eat('<') {
            return Ok(out);
        }
        while !self.eat('>') {
            let name = self.identifier()?.to_string();
            self.expect(':')?;
            // The class bound may be empty (`T::Ljava/lang/Comparable;`).
            let class_bound = match self.peek() {
                Some('L' | 'T' | '[') => Some(self.reference_type()?),
                _ => None,
            };
            let mut interface_bounds = Vec::new();
            while self.eat(':') {
                interface_bounds.push(self.reference_type()?);
            }
            out.push(TypeParameter {
                name,
                class_bound,
                interface_bounds,
            });
            if self.at_end() {
                return Err(self.error());
            }
        }
        Ok(out)
    }

    fn java_type(&mut self) -> Result<TypeSignature> {
        if let Some(base) = self.peek().and_then(BaseType::from_descriptor_char) {
            self.pos += 1;
            return Ok(TypeSignature::Base(base));
        }
        self.reference_type()
    }

    fn reference_type(&mut self) -> Result<TypeSignature> {
        match self.peek() {
            Some('L') => Ok(TypeSignature::Class(self.class_type()?)),
            Some('T') => {
                self.pos += 1;
                let name = self.identifier()?.to_string();
                self.expect(';')?;
                Ok(TypeSignature::TypeVariable(name))
            }
            Some('[') => {
                self.pos += 1;
                Ok(TypeSignature::Array(Box::new(self.java_type()?)))
            }
            _ => Err(self.error()),
        }
    }

    fn class_type(&mut self) -> Result<ClassTypeSignature> {
        self.expect('L')?;
        let mut package = String::new();
        let mut first = self.identifier()?;
        while self.eat('/') {
            if !package.is_empty() {
                package.push('/');
            }
            package.push_str(first);
            first = self.identifier()?;
        }

        let mut segments = vec![SimpleClassTypeSignature {
            name: first.to_string(),
            type_arguments: self.type_arguments()?,
        }];
        while self.eat('.') {
            let name = self.identifier()?.to_string();
            segments.push(SimpleClassTypeSignature {
                name,
                type_arguments: self.type_arguments()?,
            });
        }
        self.expect(';')?;

        Ok(ClassTypeSignature { package, segments })
    }

    fn type_arguments(&mut self) -> Result<Vec<TypeArgument>> {
        let mut out = Vec::new();
        if !self.eat('<') {
            return Ok(out);
        }
        while !self.eat('>') {
            let arg = if self.eat('*') {
                TypeArgument::Any
            } else if self.eat('+') {
                TypeArgument::Extends(self.reference_type()?)
            } else if self.eat('-') {
                TypeArgument::Super(self.reference_type()?)
            } else {
                TypeArgument::Exact(self.reference_type()?)
            };
            out.push(arg);
            if self.at_end() {
                return Err(self.error());
            }
        }
        Ok(out)
    }
}
