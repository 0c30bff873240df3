//! Java-like source text for nodes, used in diagnostics.

use std::fmt::Write;

use crate::arena::{ExprId, StmtId, TypeRefId};
use crate::ast::{Ast, Expr, LambdaBody, MethodRefTarget, Stmt, TypeRef, WildcardBound};

pub fn render_type_ref(ast: &Ast, id: TypeRefId) -> String {
    let mut out = String::new();
    write_type_ref(ast, id, &mut out);
    out
}

pub fn render_expr(ast: &Ast, id: ExprId) -> String {
    let mut out = String::new();
    write_expr(ast, id, &mut out);
    out
}

/// Statements render on one line; blocks are abbreviated to `{ ... }`.
pub fn render_stmt(ast: &Ast, id: StmtId) -> String {
    match ast.stmt(id) {
        Stmt::Block(stmts) if stmts.is_empty() => "{}".to_string(),
        Stmt::Block(_) => "{ ... }".to_string(),
        Stmt::Expr(expr) => format!("{};", render_expr(ast, *expr)),
        Stmt::Return(Some(expr)) => format!("return {};", render_expr(ast, *expr)),
        Stmt::Return(None) => "return;".to_string(),
        Stmt::Throw(expr) => format!("throw {};", render_expr(ast, *expr)),
        Stmt::LocalVar { ty, declarators } => {
            let mut out = render_type_ref(ast, *ty);
            for (idx, decl) in declarators.iter().enumerate() {
                out.push_str(if idx == 0 { " " } else { ", " });
                out.push_str(decl.name.as_str());
                if let Some(init) = decl.init {
                    let _ = write!(out, " = {}", render_expr(ast, init));
                }
            }
            out.push(';');
            out
        }
        Stmt::If { condition, .. } => format!("if ({}) ...", render_expr(ast, *condition)),
        Stmt::While { condition, .. } => format!("while ({}) ...", render_expr(ast, *condition)),
        Stmt::DoWhile { condition, .. } => format!("do ... while ({});", render_expr(ast, *condition)),
        Stmt::For { .. } => "for (...) ...".to_string(),
        Stmt::ForEach { ty, name, iterable, .. } => format!(
            "for ({} {name} : {}) ...",
            render_type_ref(ast, *ty),
            render_expr(ast, *iterable)
        ),
        Stmt::Switch { selector, .. } => format!("switch ({}) ...", render_expr(ast, *selector)),
        Stmt::Break(label) => match label {
            Some(label) => format!("break {label};"),
            None => "break;".to_string(),
        },
        Stmt::Continue(label) => match label {
            Some(label) => format!("continue {label};"),
            None => "continue;".to_string(),
        },
        Stmt::Try { .. } => "try ...".to_string(),
        Stmt::Labeled { label, .. } => format!("{label}: ..."),
        Stmt::LocalClass(decl) => format!("class {} {{ ... }}", ast.decl(*decl).name),
        Stmt::Empty => ";".to_string(),
    }
}

fn write_list(ast: &Ast, ids: &[ExprId], out: &mut String) {
    for (idx, id) in ids.iter().enumerate() {
        if idx > 0 {
            out.push_str(", ");
        }
        write_expr(ast, *id, out);
    }
}

fn write_type_args(ast: &Ast, ids: &[TypeRefId], out: &mut String) {
    out.push('<');
    for (idx, id) in ids.iter().enumerate() {
        if idx > 0 {
            out.push_str(", ");
        }
        write_type_ref(ast, *id, out);
    }
    out.push('>');
}

fn write_type_ref(ast: &Ast, id: TypeRefId, out: &mut String) {
    match ast.type_ref(id) {
        TypeRef::Primitive(p) => out.push_str(p.keyword()),
        TypeRef::Void => out.push_str("void"),
        TypeRef::Var => out.push_str("var"),
        TypeRef::Named { name, args } => {
            out.push_str(&name.to_dotted());
            if let Some(args) = args {
                write_type_args(ast, args, out);
            }
        }
        TypeRef::Array { element, dims } => {
            write_type_ref(ast, *element, out);
            for _ in 0..*dims {
                out.push_str("[]");
            }
        }
        TypeRef::Wildcard(bound) => {
            out.push('?');
            match bound {
                WildcardBound::Unbounded => {}
                WildcardBound::Extends(b) => {
                    out.push_str(" extends ");
                    write_type_ref(ast, *b, out);
                }
                WildcardBound::Super(b) => {
                    out.push_str(" super ");
                    write_type_ref(ast, *b, out);
                }
            }
        }
    }
}

fn write_expr(ast: &Ast, id: ExprId, out: &mut String) {
    match ast.expr(id) {
        Expr::Literal { text, .. } => out.push_str(text),
        Expr::Name(name) => out.push_str(name.as_str()),
        Expr::FieldAccess { receiver, name } => {
            write_expr(ast, *receiver, out);
            out.push('.');
            out.push_str(name.as_str());
        }
        Expr::MethodCall {
            receiver,
            type_args,
            name,
            args,
        } => {
            if let Some(receiver) = receiver {
                write_expr(ast, *receiver, out);
                out.push('.');
            }
            if !type_args.is_empty() {
                write_type_args(ast, type_args, out);
            }
            out.push_str(name.as_str());
            out.push('(');
            write_list(ast, args, out);
            out.push(')');
        }
        Expr::New {
            outer,
            ty,
            args,
            body,
        } => {
            if let Some(outer) = outer {
                write_expr(ast, *outer, out);
                out.push('.');
            }
            out.push_str("new ");
            write_type_ref(ast, *ty, out);
            out.push('(');
            write_list(ast, args, out);
            out.push(')');
            if body.is_some() {
                out.push_str(" { ... }");
            }
        }
        Expr::NewArray {
            element,
            dims,
            extra_dims,
            init,
        } => {
            out.push_str("new ");
            write_type_ref(ast, *element, out);
            for dim in dims {
                out.push('[');
                write_expr(ast, *dim, out);
                out.push(']');
            }
            for _ in 0..*extra_dims {
                out.push_str("[]");
            }
            if let Some(init) = init {
                out.push(' ');
                write_expr(ast, *init, out);
            }
        }
        Expr::ArrayInit(elements) => {
            out.push('{');
            write_list(ast, elements, out);
            out.push('}');
        }
        Expr::ArrayAccess { array, index } => {
            write_expr(ast, *array, out);
            out.push('[');
            write_expr(ast, *index, out);
            out.push(']');
        }
        Expr::Unary { op, operand } => {
            if op.is_postfix() {
                write_expr(ast, *operand, out);
                out.push_str(op.symbol());
            } else {
                out.push_str(op.symbol());
                write_expr(ast, *operand, out);
            }
        }
        Expr::Binary { op, lhs, rhs } => {
            write_expr(ast, *lhs, out);
            let _ = write!(out, " {} ", op.symbol());
            write_expr(ast, *rhs, out);
        }
        Expr::Assign { op, target, value } => {
            write_expr(ast, *target, out);
            match op {
                Some(op) => {
                    let _ = write!(out, " {}= ", op.symbol());
                }
                None => out.push_str(" = "),
            }
            write_expr(ast, *value, out);
        }
        Expr::Conditional {
            condition,
            then_expr,
            else_expr,
        } => {
            write_expr(ast, *condition, out);
            out.push_str(" ? ");
            write_expr(ast, *then_expr, out);
            out.push_str(" : ");
            write_expr(ast, *else_expr, out);
        }
        Expr::Cast { ty, expr } => {
            out.push('(');
            write_type_ref(ast, *ty, out);
            out.push_str(") ");
            write_expr(ast, *expr, out);
        }
        Expr::InstanceOf { expr, ty } => {
            write_expr(ast, *expr, out);
            out.push_str(" instanceof ");
            write_type_ref(ast, *ty, out);
        }
        Expr::Lambda { params, body } => {
            out.push('(');
            for (idx, param) in params.iter().enumerate() {
                if idx > 0 {
                    out.push_str(", ");
                }
                if let Some(ty) = param.ty {
                    write_type_ref(ast, ty, out);
                    out.push(' ');
                }
                out.push_str(param.name.as_str());
            }
            out.push_str(") -> ");
            match body {
                LambdaBody::Expr(expr) => write_expr(ast, *expr, out),
                LambdaBody::Block(_) => out.push_str("{ ... }"),
            }
        }
        Expr::MethodRef {
            target,
            type_args,
            name,
        } => {
            match target {
                MethodRefTarget::Expr(expr) => write_expr(ast, *expr, out),
                MethodRefTarget::Type(ty) => write_type_ref(ast, *ty, out),
                MethodRefTarget::Super => out.push_str("super"),
            }
            out.push_str("::");
            if !type_args.is_empty() {
                write_type_args(ast, type_args, out);
            }
            out.push_str(name.as_str());
        }
        Expr::This { qualifier } => {
            if let Some(q) = qualifier {
                out.push_str(&q.to_dotted());
                out.push('.');
            }
            out.push_str("this");
        }
        Expr::Super => out.push_str("super"),
        Expr::ClassLiteral(ty) => {
            write_type_ref(ast, *ty, out);
            out.push_str(".class");
        }
    }
}
