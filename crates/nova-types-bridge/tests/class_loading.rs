use std::path::Path;
use std::sync::Arc;

use nova_classfile::access;
use nova_classpath::{ClasspathEntry, ClasspathIndex};
use nova_types::{ClassKind, ClassLoadError, Nesting, SymbolType, TypeEnv};
use nova_types_bridge::ClasspathTypeEnv;
use pretty_assertions::assert_eq;

#[derive(Default)]
struct Pool {
    bytes: Vec<u8>,
    count: u16,
}

impl Pool {
    fn utf8(&mut self, text: &str) -> u16 {
        self.bytes.push(1);
        self.bytes.extend_from_slice(&(text.len() as u16).to_be_bytes());
        self.bytes.extend_from_slice(text.as_bytes());
        self.count += 1;
        self.count
    }

    fn class(&mut self, internal: &str) -> u16 {
        let name = self.utf8(internal);
        self.bytes.push(7);
        self.bytes.extend_from_slice(&name.to_be_bytes());
        self.count += 1;
        self.count
    }
}

struct Member<'a> {
    flags: u16,
    name: &'a str,
    descriptor: &'a str,
    signature: Option<&'a str>,
}

struct Inner<'a> {
    inner: &'a str,
    outer: Option<&'a str>,
    name: Option<&'a str>,
    flags: u16,
}

struct ClassSpec<'a> {
    flags: u16,
    name: &'a str,
    super_class: &'a str,
    signature: Option<&'a str>,
    fields: Vec<Member<'a>>,
    methods: Vec<Member<'a>>,
    inner: Vec<Inner<'a>>,
}

fn u2(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_be_bytes());
}

fn assemble(spec: &ClassSpec<'_>) -> Vec<u8> {
    let mut cp = Pool::default();
    let this = cp.class(spec.name);
    let sup = cp.class(spec.super_class);
    let signature_attr = cp.utf8("Signature");
    let inner_attr = cp.utf8("InnerClasses");

    let encode_members = |cp: &mut Pool, members: &[Member<'_>]| {
        let mut out = Vec::new();
        u2(&mut out, members.len() as u16);
        for m in members {
            let name = cp.utf8(m.name);
            let desc = cp.utf8(m.descriptor);
            u2(&mut out, m.flags);
            u2(&mut out, name);
            u2(&mut out, desc);
            match m.signature {
                Some(sig) => {
                    let sig = cp.utf8(sig);
                    u2(&mut out, 1);
                    u2(&mut out, signature_attr);
                    out.extend_from_slice(&2u32.to_be_bytes());
                    u2(&mut out, sig);
                }
                None => u2(&mut out, 0),
            }
        }
        out
    };
    let fields = encode_members(&mut cp, &spec.fields);
    let methods = encode_members(&mut cp, &spec.methods);

    let mut attrs = Vec::new();
    let mut attr_count = 0u16;
    if let Some(sig) = spec.signature {
        let sig = cp.utf8(sig);
        u2(&mut attrs, signature_attr);
        attrs.extend_from_slice(&2u32.to_be_bytes());
        u2(&mut attrs, sig);
        attr_count += 1;
    }
    if !spec.inner.is_empty() {
        let mut body = Vec::new();
        u2(&mut body, spec.inner.len() as u16);
        for info in &spec.inner {
            let inner = cp.class(info.inner);
            let outer = info.outer.map_or(0, |o| cp.class(o));
            let name = info.name.map_or(0, |n| cp.utf8(n));
            u2(&mut body, inner);
            u2(&mut body, outer);
            u2(&mut body, name);
            u2(&mut body, info.flags);
        }
        u2(&mut attrs, inner_attr);
        attrs.extend_from_slice(&(body.len() as u32).to_be_bytes());
        attrs.extend_from_slice(&body);
        attr_count += 1;
    }

    let mut out = Vec::new();
    out.extend_from_slice(&0xCAFEBABEu32.to_be_bytes());
    u2(&mut out, 0);
    u2(&mut out, 52);
    u2(&mut out, cp.count + 1);
    out.extend_from_slice(&cp.bytes);
    u2(&mut out, spec.flags);
    u2(&mut out, this);
    u2(&mut out, sup);
    u2(&mut out, 0);
    out.extend_from_slice(&fields);
    out.extend_from_slice(&methods);
    u2(&mut out, attr_count);
    out.extend_from_slice(&attrs);
    out
}

fn write(root: &Path, relative: &str, bytes: &[u8]) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, bytes).unwrap();
}

fn box_class() -> Vec<u8> {
    assemble(&ClassSpec {
        flags: access::ACC_PUBLIC,
        name: "p/Box",
        super_class: "java/lang/Object",
        signature: Some("<T:Ljava/lang/Object;>Ljava/lang/Object;"),
        fields: vec![
            Member {
                flags: access::ACC_PRIVATE,
                name: "value",
                descriptor: "Ljava/lang/Object;",
                signature: Some("TT;"),
            },
            Member {
                flags: access::ACC_SYNTHETIC | access::ACC_FINAL,
                name: "this$0",
                descriptor: "Lp/Box;",
                signature: None,
            },
        ],
        methods: vec![
            Member {
                flags: access::ACC_PUBLIC,
                name: "<init>",
                descriptor: "(Ljava/lang/Object;)V",
                signature: Some("(TT;)V"),
            },
            Member {
                flags: access::ACC_PUBLIC,
                name: "get",
                descriptor: "()Ljava/lang/Object;",
                signature: Some("()TT;"),
            },
            Member {
                flags: access::ACC_PRIVATE | access::ACC_STATIC | access::ACC_SYNTHETIC,
                name: "lambda$get$0",
                descriptor: "()V",
                signature: None,
            },
            Member {
                flags: access::ACC_STATIC,
                name: "<clinit>",
                descriptor: "()V",
                signature: None,
            },
        ],
        inner: vec![Inner {
            inner: "p/Box$Cell",
            outer: Some("p/Box"),
            name: Some("Cell"),
            flags: access::ACC_PUBLIC | access::ACC_STATIC,
        }],
    })
}

fn cell_class() -> Vec<u8> {
    assemble(&ClassSpec {
        flags: access::ACC_PUBLIC | access::ACC_INTERFACE | access::ACC_ABSTRACT,
        name: "p/Box$Cell",
        super_class: "java/lang/Object",
        signature: None,
        fields: Vec::new(),
        methods: vec![Member {
            flags: access::ACC_PUBLIC | access::ACC_ABSTRACT,
            name: "size",
            descriptor: "()I",
            signature: None,
        }],
        inner: vec![Inner {
            inner: "p/Box$Cell",
            outer: Some("p/Box"),
            name: Some("Cell"),
            flags: access::ACC_PUBLIC | access::ACC_STATIC | access::ACC_INTERFACE,
        }],
    })
}

fn env_for(root: &Path) -> ClasspathTypeEnv {
    let index = ClasspathIndex::new(vec![ClasspathEntry::ClassDir(root.to_path_buf())]);
    ClasspathTypeEnv::new(Arc::new(index))
}

#[test]
fn loads_generic_class_with_members() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "p/Box.class", &box_class());
    let env = env_for(dir.path());

    let def = env.class("p.Box").unwrap();
    assert_eq!(def.kind, ClassKind::Class);
    assert_eq!(def.nesting, Nesting::TopLevel);
    assert_eq!(def.type_params.len(), 1);
    assert_eq!(def.type_params[0].bounds, vec![SymbolType::object()]);
    assert_eq!(def.super_class, Some(SymbolType::object()));
    assert_eq!(def.member_classes, vec!["p.Box$Cell".to_string()]);

    let fields: Vec<_> = def.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(fields, vec!["value"]);
    assert_eq!(def.fields[0].ty.template_variable(), Some("T"));

    let methods: Vec<_> = def.methods.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(methods, vec!["get"]);
    assert_eq!(def.constructors.len(), 1);
    assert_eq!(def.constructors[0].params[0].template_variable(), Some("T"));

    assert_eq!(env.cached_classes(), 1);
    let again = env.class("p.Box").unwrap();
    assert!(Arc::ptr_eq(&def, &again));
}

#[test]
fn member_interface_records_nesting() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "p/Box.class", &box_class());
    write(dir.path(), "p/Box$Cell.class", &cell_class());
    let env = env_for(dir.path());

    let cell = env.class("p.Box$Cell").unwrap();
    assert_eq!(cell.kind, ClassKind::Interface);
    assert_eq!(cell.nesting, Nesting::Member { is_static: true });
    assert_eq!(cell.enclosing.as_deref(), Some("p.Box"));
    assert_eq!(cell.super_class, None);
    assert!(cell.methods[0].is_abstract);
}

#[test]
fn misplaced_class_file_is_incompatible() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "q/Wrong.class", &box_class());
    let env = env_for(dir.path());

    assert_eq!(
        env.class("q.Wrong").unwrap_err(),
        ClassLoadError::IncompatibleClassChange {
            requested: "q.Wrong".into(),
            found: "p.Box".into(),
        }
    );
    assert_eq!(
        env.class("p.Missing").unwrap_err(),
        ClassLoadError::NotFound("p.Missing".into())
    );
}

#[test]
fn garbage_is_malformed() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "p/Bad.class", b"not a class");
    let env = env_for(dir.path());
    assert!(matches!(
        env.class("p.Bad"),
        Err(ClassLoadError::Malformed { .. })
    ));
}
