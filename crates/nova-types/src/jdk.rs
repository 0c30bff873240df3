//! Built-in model of a small slice of the JDK, written as class-file
//! signatures.

use nova_classfile::access::{ACC_ABSTRACT, ACC_PUBLIC, ACC_STATIC, ACC_VARARGS};
use nova_classfile::parse_method_signature;

use crate::env::{ClassDef, ClassKind, Nesting};
use crate::signature::{field_def, method_from_signature, parse_class_header, TypeVarScope};

const PUB: u16 = ACC_PUBLIC;
const STATIC: u16 = ACC_PUBLIC | ACC_STATIC;
const ABSTRACT: u16 = ACC_PUBLIC | ACC_ABSTRACT;
const VARARGS: u16 = ACC_PUBLIC | ACC_VARARGS;
const STATIC_VARARGS: u16 = ACC_PUBLIC | ACC_STATIC | ACC_VARARGS;

const OBJECT_HEADER: &str = "Ljava/lang/Object;";

struct ClassBuilder {
    def: ClassDef,
    scope: TypeVarScope,
}

impl ClassBuilder {
    fn new(name: &str, kind: ClassKind, header: &str) -> Self {
        let header = parse_class_header(header).expect("built-in class signature");
        let mut def = ClassDef::new(name, kind);
        def.type_params = header.type_params;
        def.interfaces = header.interfaces;
        if kind != ClassKind::Interface && name != crate::OBJECT {
            def.super_class = Some(header.super_class);
        }
        Self {
            def,
            scope: header.scope,
        }
    }

    fn abstract_class(mut self) -> Self {
        self.def.is_abstract = true;
        self
    }

    fn member_of(mut self, outer: &str) -> Self {
        self.def.nesting = Nesting::Member { is_static: true };
        self.def.enclosing = Some(outer.to_string());
        self
    }

    fn member_class(mut self, nested: &str) -> Self {
        self.def.member_classes.push(nested.to_string());
        self
    }

    fn method(mut self, name: &str, flags: u16, signature: &str) -> Self {
        let sig = parse_method_signature(signature).expect("built-in method signature");
        self.def
            .methods
            .push(method_from_signature(name, flags, &sig, &self.scope));
        self
    }

    fn ctor(mut self, flags: u16, signature: &str) -> Self {
        let sig = parse_method_signature(signature).expect("built-in constructor signature");
        self.def
            .constructors
            .push(method_from_signature("<init>", flags, &sig, &self.scope));
        self
    }

    fn field(mut self, name: &str, flags: u16, ty: &str) -> Self {
        // Primitive fields carry no signature; their descriptor is enough.
        let signature = matches!(ty.as_bytes().first(), Some(b'L' | b'T' | b'[')).then_some(ty);
        let field = field_def(name, flags, ty, signature, &self.scope).expect("built-in field type");
        self.def.fields.push(field);
        self
    }

    fn build(self) -> ClassDef {
        self.def
    }
}

fn class(name: &str, header: &str) -> ClassBuilder {
    ClassBuilder::new(name, ClassKind::Class, header)
}

fn interface(name: &str, header: &str) -> ClassBuilder {
    ClassBuilder::new(name, ClassKind::Interface, header)
}

fn boxed_number(name: &str, internal: &str, prim: char, value_method: &str, parse: &str) -> ClassDef {
    let mut builder = class(
        name,
        &format!("Ljava/lang/Number;Ljava/lang/Comparable<L{internal};>;"),
    )
    .ctor(PUB, &format!("({prim})V"))
    .method("valueOf", STATIC, &format!("({prim})L{internal};"))
    .method("valueOf", STATIC, &format!("(Ljava/lang/String;)L{internal};"))
    .method(parse, STATIC, &format!("(Ljava/lang/String;){prim}"))
    .method("compareTo", PUB, &format!("(L{internal};)I"))
    .method("toString", STATIC, &format!("({prim})Ljava/lang/String;"))
    .field("MAX_VALUE", STATIC, &prim.to_string())
    .field("MIN_VALUE", STATIC, &prim.to_string());
    builder = builder.method(value_method, PUB, &format!("(){prim}"));
    for (method, ret) in [("intValue", 'I'), ("longValue", 'J'), ("doubleValue", 'D')] {
        if method != value_method {
            builder = builder.method(method, PUB, &format!("(){ret}"));
        }
    }
    builder.build()
}

fn exception(name: &str, super_internal: &str) -> ClassDef {
    class(name, &format!("L{super_internal};"))
        .ctor(PUB, "()V")
        .ctor(PUB, "(Ljava/lang/String;)V")
        .build()
}

pub(crate) fn minimal_jdk() -> Vec<ClassDef> {
    let mut out = vec![
        class(crate::OBJECT, OBJECT_HEADER)
            .ctor(PUB, "()V")
            .method("equals", PUB, "(Ljava/lang/Object;)Z")
            .method("hashCode", PUB, "()I")
            .method("toString", PUB, "()Ljava/lang/String;")
            .method("getClass", PUB, "()Ljava/lang/Class<*>;")
            .build(),
        interface(crate::SERIALIZABLE, OBJECT_HEADER).build(),
        interface(crate::CLONEABLE, OBJECT_HEADER).build(),
        interface("java.lang.AutoCloseable", OBJECT_HEADER)
            .method("close", ABSTRACT, "()V")
            .build(),
        interface(
            "java.lang.Comparable",
            "<T:Ljava/lang/Object;>Ljava/lang/Object;",
        )
        .method("compareTo", ABSTRACT, "(TT;)I")
        .build(),
        interface("java.lang.CharSequence", OBJECT_HEADER)
            .method("length", ABSTRACT, "()I")
            .method("charAt", ABSTRACT, "(I)C")
            .method("toString", ABSTRACT, "()Ljava/lang/String;")
            .build(),
        class(
            crate::STRING,
            "Ljava/lang/Object;Ljava/io/Serializable;Ljava/lang/Comparable<Ljava/lang/String;>;Ljava/lang/CharSequence;",
        )
        .ctor(PUB, "()V")
        .ctor(PUB, "(Ljava/lang/String;)V")
        .ctor(PUB, "([C)V")
        .method("length", PUB, "()I")
        .method("isEmpty", PUB, "()Z")
        .method("charAt", PUB, "(I)C")
        .method("substring", PUB, "(I)Ljava/lang/String;")
        .method("substring", PUB, "(II)Ljava/lang/String;")
        .method("indexOf", PUB, "(I)I")
        .method("indexOf", PUB, "(Ljava/lang/String;)I")
        .method("contains", PUB, "(Ljava/lang/CharSequence;)Z")
        .method("concat", PUB, "(Ljava/lang/String;)Ljava/lang/String;")
        .method("trim", PUB, "()Ljava/lang/String;")
        .method("toUpperCase", PUB, "()Ljava/lang/String;")
        .method("toLowerCase", PUB, "()Ljava/lang/String;")
        .method("equals", PUB, "(Ljava/lang/Object;)Z")
        .method("compareTo", PUB, "(Ljava/lang/String;)I")
        .method("toCharArray", PUB, "()[C")
        .method("valueOf", STATIC, "(Ljava/lang/Object;)Ljava/lang/String;")
        .method("valueOf", STATIC, "(I)Ljava/lang/String;")
        .method("valueOf", STATIC, "(J)Ljava/lang/String;")
        .method("valueOf", STATIC, "(C)Ljava/lang/String;")
        .method("valueOf", STATIC, "(Z)Ljava/lang/String;")
        .method("valueOf", STATIC, "(D)Ljava/lang/String;")
        .method(
            "format",
            STATIC_VARARGS,
            "(Ljava/lang/String;[Ljava/lang/Object;)Ljava/lang/String;",
        )
        .method(
            "join",
            STATIC_VARARGS,
            "(Ljava/lang/CharSequence;[Ljava/lang/CharSequence;)Ljava/lang/String;",
        )
        .build(),
        class("java.lang.Number", "Ljava/lang/Object;Ljava/io/Serializable;")
            .abstract_class()
            .ctor(PUB, "()V")
            .method("intValue", ABSTRACT, "()I")
            .method("longValue", ABSTRACT, "()J")
            .method("doubleValue", ABSTRACT, "()D")
            .build(),
        boxed_number("java.lang.Byte", "java/lang/Byte", 'B', "byteValue", "parseByte"),
        boxed_number("java.lang.Short", "java/lang/Short", 'S', "shortValue", "parseShort"),
        boxed_number("java.lang.Integer", "java/lang/Integer", 'I', "intValue", "parseInt"),
        boxed_number("java.lang.Long", "java/lang/Long", 'J', "longValue", "parseLong"),
        boxed_number("java.lang.Float", "java/lang/Float", 'F', "floatValue", "parseFloat"),
        boxed_number("java.lang.Double", "java/lang/Double", 'D', "doubleValue", "parseDouble"),
        class(
            "java.lang.Character",
            "Ljava/lang/Object;Ljava/io/Serializable;Ljava/lang/Comparable<Ljava/lang/Character;>;",
        )
        .ctor(PUB, "(C)V")
        .method("valueOf", STATIC, "(C)Ljava/lang/Character;")
        .method("charValue", PUB, "()C")
        .method("isDigit", STATIC, "(C)Z")
        .method("isLetter", STATIC, "(C)Z")
        .build(),
        class(
            "java.lang.Boolean",
            "Ljava/lang/Object;Ljava/io/Serializable;Ljava/lang/Comparable<Ljava/lang/Boolean;>;",
        )
        .ctor(PUB, "(Z)V")
        .method("valueOf", STATIC, "(Z)Ljava/lang/Boolean;")
        .method("parseBoolean", STATIC, "(Ljava/lang/String;)Z")
        .method("booleanValue", PUB, "()Z")
        .field("TRUE", STATIC, "Ljava/lang/Boolean;")
        .field("FALSE", STATIC, "Ljava/lang/Boolean;")
        .build(),
        class(
            "java.lang.Class",
            "<T:Ljava/lang/Object;>Ljava/lang/Object;Ljava/io/Serializable;",
        )
        .method("getName", PUB, "()Ljava/lang/String;")
        .method("getSimpleName", PUB, "()Ljava/lang/String;")
        .method("isInstance", PUB, "(Ljava/lang/Object;)Z")
        .method("cast", PUB, "(Ljava/lang/Object;)TT;")
        .build(),
        class(
            "java.lang.Enum",
            "<E:Ljava/lang/Enum<TE;>;>Ljava/lang/Object;Ljava/lang/Comparable<TE;>;Ljava/io/Serializable;",
        )
        .abstract_class()
        .method("name", PUB, "()Ljava/lang/String;")
        .method("ordinal", PUB, "()I")
        .method("compareTo", PUB, "(TE;)I")
        .build(),
        interface("java.lang.Runnable", OBJECT_HEADER)
            .method("run", ABSTRACT, "()V")
            .build(),
        interface(
            "java.lang.Iterable",
            "<T:Ljava/lang/Object;>Ljava/lang/Object;",
        )
        .method("iterator", ABSTRACT, "()Ljava/util/Iterator<TT;>;")
        .method("forEach", PUB, "(Ljava/util/function/Consumer<-TT;>;)V")
        .build(),
        class("java.lang.Math", OBJECT_HEADER)
            .field("PI", STATIC, "D")
            .field("E", STATIC, "D")
            .method("max", STATIC, "(II)I")
            .method("max", STATIC, "(JJ)J")
            .method("max", STATIC, "(FF)F")
            .method("max", STATIC, "(DD)D")
            .method("min", STATIC, "(II)I")
            .method("min", STATIC, "(JJ)J")
            .method("min", STATIC, "(FF)F")
            .method("min", STATIC, "(DD)D")
            .method("abs", STATIC, "(I)I")
            .method("abs", STATIC, "(J)J")
            .method("abs", STATIC, "(D)D")
            .method("sqrt", STATIC, "(D)D")
            .method("pow", STATIC, "(DD)D")
            .method("round", STATIC, "(D)J")
            .build(),
        class("java.lang.System", OBJECT_HEADER)
            .field("out", STATIC, "Ljava/io/PrintStream;")
            .field("err", STATIC, "Ljava/io/PrintStream;")
            .method("currentTimeMillis", STATIC, "()J")
            .method("nanoTime", STATIC, "()J")
            .method(
                "arraycopy",
                STATIC,
                "(Ljava/lang/Object;ILjava/lang/Object;II)V",
            )
            .method("getProperty", STATIC, "(Ljava/lang/String;)Ljava/lang/String;")
            .build(),
        class("java.io.PrintStream", OBJECT_HEADER)
            .method("println", PUB, "()V")
            .method("println", PUB, "(Z)V")
            .method("println", PUB, "(C)V")
            .method("println", PUB, "(I)V")
            .method("println", PUB, "(J)V")
            .method("println", PUB, "(F)V")
            .method("println", PUB, "(D)V")
            .method("println", PUB, "([C)V")
            .method("println", PUB, "(Ljava/lang/String;)V")
            .method("println", PUB, "(Ljava/lang/Object;)V")
            .method("print", PUB, "(Ljava/lang/String;)V")
            .method("print", PUB, "(Ljava/lang/Object;)V")
            .method(
                "printf",
                VARARGS,
                "(Ljava/lang/String;[Ljava/lang/Object;)Ljava/io/PrintStream;",
            )
            .build(),
        class(
            "java.lang.StringBuilder",
            "Ljava/lang/Object;Ljava/io/Serializable;Ljava/lang/CharSequence;",
        )
        .ctor(PUB, "()V")
        .ctor(PUB, "(I)V")
        .ctor(PUB, "(Ljava/lang/String;)V")
        .method("append", PUB, "(Ljava/lang/String;)Ljava/lang/StringBuilder;")
        .method("append", PUB, "(Ljava/lang/Object;)Ljava/lang/StringBuilder;")
        .method("append", PUB, "(I)Ljava/lang/StringBuilder;")
        .method("append", PUB, "(J)Ljava/lang/StringBuilder;")
        .method("append", PUB, "(C)Ljava/lang/StringBuilder;")
        .method("append", PUB, "(Z)Ljava/lang/StringBuilder;")
        .method("append", PUB, "(D)Ljava/lang/StringBuilder;")
        .method("length", PUB, "()I")
        .method("charAt", PUB, "(I)C")
        .method("reverse", PUB, "()Ljava/lang/StringBuilder;")
        .method("toString", PUB, "()Ljava/lang/String;")
        .build(),
        class("java.lang.Throwable", "Ljava/lang/Object;Ljava/io/Serializable;")
            .ctor(PUB, "()V")
            .ctor(PUB, "(Ljava/lang/String;)V")
            .method("getMessage", PUB, "()Ljava/lang/String;")
            .method("printStackTrace", PUB, "()V")
            .build(),
        exception("java.lang.Exception", "java/lang/Throwable"),
        exception("java.lang.RuntimeException", "java/lang/Exception"),
        exception(
            "java.lang.IllegalArgumentException",
            "java/lang/RuntimeException",
        ),
        exception("java.lang.IllegalStateException", "java/lang/RuntimeException"),
        exception("java.lang.NullPointerException", "java/lang/RuntimeException"),
        // java.util
        interface(
            "java.util.Iterator",
            "<E:Ljava/lang/Object;>Ljava/lang/Object;",
        )
        .method("hasNext", ABSTRACT, "()Z")
        .method("next", ABSTRACT, "()TE;")
        .build(),
        interface(
            "java.util.Collection",
            "<E:Ljava/lang/Object;>Ljava/lang/Object;Ljava/lang/Iterable<TE;>;",
        )
        .method("size", ABSTRACT, "()I")
        .method("isEmpty", ABSTRACT, "()Z")
        .method("contains", ABSTRACT, "(Ljava/lang/Object;)Z")
        .method("add", ABSTRACT, "(TE;)Z")
        .method("remove", ABSTRACT, "(Ljava/lang/Object;)Z")
        .method("addAll", ABSTRACT, "(Ljava/util/Collection<+TE;>;)Z")
        .method("clear", ABSTRACT, "()V")
        .method("toArray", ABSTRACT, "()[Ljava/lang/Object;")
        .method("stream", PUB, "()Ljava/util/stream/Stream<TE;>;")
        .build(),
        interface(
            "java.util.List",
            "<E:Ljava/lang/Object;>Ljava/lang/Object;Ljava/util/Collection<TE;>;",
        )
        .method("get", ABSTRACT, "(I)TE;")
        .method("set", ABSTRACT, "(ITE;)TE;")
        .method("add", ABSTRACT, "(ITE;)V")
        .method("remove", ABSTRACT, "(I)TE;")
        .method("indexOf", ABSTRACT, "(Ljava/lang/Object;)I")
        .method("subList", ABSTRACT, "(II)Ljava/util/List<TE;>;")
        .method("sort", PUB, "(Ljava/util/Comparator<-TE;>;)V")
        .method(
            "of",
            STATIC_VARARGS,
            "<E:Ljava/lang/Object;>([TE;)Ljava/util/List<TE;>;",
        )
        .build(),
        interface(
            "java.util.Set",
            "<E:Ljava/lang/Object;>Ljava/lang/Object;Ljava/util/Collection<TE;>;",
        )
        .method(
            "of",
            STATIC_VARARGS,
            "<E:Ljava/lang/Object;>([TE;)Ljava/util/Set<TE;>;",
        )
        .build(),
        class(
            "java.util.ArrayList",
            "<E:Ljava/lang/Object;>Ljava/lang/Object;Ljava/util/List<TE;>;Ljava/lang/Cloneable;Ljava/io/Serializable;",
        )
        .ctor(PUB, "()V")
        .ctor(PUB, "(I)V")
        .ctor(PUB, "(Ljava/util/Collection<+TE;>;)V")
        .method("size", PUB, "()I")
        .method("isEmpty", PUB, "()Z")
        .method("get", PUB, "(I)TE;")
        .method("add", PUB, "(TE;)Z")
        .method("iterator", PUB, "()Ljava/util/Iterator<TE;>;")
        .build(),
        class(
            "java.util.HashSet",
            "<E:Ljava/lang/Object;>Ljava/lang/Object;Ljava/util/Set<TE;>;Ljava/lang/Cloneable;Ljava/io/Serializable;",
        )
        .ctor(PUB, "()V")
        .ctor(PUB, "(Ljava/util/Collection<+TE;>;)V")
        .method("size", PUB, "()I")
        .method("add", PUB, "(TE;)Z")
        .method("iterator", PUB, "()Ljava/util/Iterator<TE;>;")
        .build(),
        interface(
            "java.util.Map",
            "<K:Ljava/lang/Object;V:Ljava/lang/Object;>Ljava/lang/Object;",
        )
        .member_class("java.util.Map$Entry")
        .method("size", ABSTRACT, "()I")
        .method("isEmpty", ABSTRACT, "()Z")
        .method("get", ABSTRACT, "(Ljava/lang/Object;)TV;")
        .method("put", ABSTRACT, "(TK;TV;)TV;")
        .method("containsKey", ABSTRACT, "(Ljava/lang/Object;)Z")
        .method("remove", ABSTRACT, "(Ljava/lang/Object;)TV;")
        .method("keySet", ABSTRACT, "()Ljava/util/Set<TK;>;")
        .method("values", ABSTRACT, "()Ljava/util/Collection<TV;>;")
        .method(
            "entrySet",
            ABSTRACT,
            "()Ljava/util/Set<Ljava/util/Map$Entry<TK;TV;>;>;",
        )
        .method("getOrDefault", PUB, "(Ljava/lang/Object;TV;)TV;")
        .method(
            "computeIfAbsent",
            PUB,
            "(TK;Ljava/util/function/Function<-TK;+TV;>;)TV;",
        )
        .method(
            "forEach",
            PUB,
            "(Ljava/util/function/BiConsumer<-TK;-TV;>;)V",
        )
        .build(),
        interface(
            "java.util.Map$Entry",
            "<K:Ljava/lang/Object;V:Ljava/lang/Object;>Ljava/lang/Object;",
        )
        .member_of("java.util.Map")
        .method("getKey", ABSTRACT, "()TK;")
        .method("getValue", ABSTRACT, "()TV;")
        .method("setValue", ABSTRACT, "(TV;)TV;")
        .build(),
        class(
            "java.util.HashMap",
            "<K:Ljava/lang/Object;V:Ljava/lang/Object;>Ljava/lang/Object;Ljava/util/Map<TK;TV;>;Ljava/lang/Cloneable;Ljava/io/Serializable;",
        )
        .ctor(PUB, "()V")
        .ctor(PUB, "(I)V")
        .ctor(PUB, "(Ljava/util/Map<+TK;+TV;>;)V")
        .method("get", PUB, "(Ljava/lang/Object;)TV;")
        .method("put", PUB, "(TK;TV;)TV;")
        .method("size", PUB, "()I")
        .build(),
        interface(
            "java.util.Comparator",
            "<T:Ljava/lang/Object;>Ljava/lang/Object;",
        )
        .method("compare", ABSTRACT, "(TT;TT;)I")
        .method("equals", ABSTRACT, "(Ljava/lang/Object;)Z")
        .method("reversed", PUB, "()Ljava/util/Comparator<TT;>;")
        .method(
            "comparing",
            STATIC,
            "<T:Ljava/lang/Object;U::Ljava/lang/Comparable<-TU;>;>(Ljava/util/function/Function<-TT;+TU;>;)Ljava/util/Comparator<TT;>;",
        )
        .method(
            "naturalOrder",
            STATIC,
            "<T::Ljava/lang/Comparable<-TT;>;>()Ljava/util/Comparator<TT;>;",
        )
        .build(),
        class(
            "java.util.Optional",
            "<T:Ljava/lang/Object;>Ljava/lang/Object;",
        )
        .method(
            "of",
            STATIC,
            "<T:Ljava/lang/Object;>(TT;)Ljava/util/Optional<TT;>;",
        )
        .method(
            "ofNullable",
            STATIC,
            "<T:Ljava/lang/Object;>(TT;)Ljava/util/Optional<TT;>;",
        )
        .method(
            "empty",
            STATIC,
            "<T:Ljava/lang/Object;>()Ljava/util/Optional<TT;>;",
        )
        .method("get", PUB, "()TT;")
        .method("isPresent", PUB, "()Z")
        .method("orElse", PUB, "(TT;)TT;")
        .method(
            "map",
            PUB,
            "<U:Ljava/lang/Object;>(Ljava/util/function/Function<-TT;+TU;>;)Ljava/util/Optional<TU;>;",
        )
        .method(
            "ifPresent",
            PUB,
            "(Ljava/util/function/Consumer<-TT;>;)V",
        )
        .build(),
        class("java.util.Arrays", OBJECT_HEADER)
            .method(
                "asList",
                STATIC_VARARGS,
                "<T:Ljava/lang/Object;>([TT;)Ljava/util/List<TT;>;",
            )
            .method("sort", STATIC, "([I)V")
            .method("sort", STATIC, "([Ljava/lang/Object;)V")
            .method("toString", STATIC, "([I)Ljava/lang/String;")
            .method("toString", STATIC, "([Ljava/lang/Object;)Ljava/lang/String;")
            .method(
                "stream",
                STATIC,
                "<T:Ljava/lang/Object;>([TT;)Ljava/util/stream/Stream<TT;>;",
            )
            .build(),
        class("java.util.Objects", OBJECT_HEADER)
            .method("equals", STATIC, "(Ljava/lang/Object;Ljava/lang/Object;)Z")
            .method("hash", STATIC_VARARGS, "([Ljava/lang/Object;)I")
            .method("isNull", STATIC, "(Ljava/lang/Object;)Z")
            .method(
                "requireNonNull",
                STATIC,
                "<T:Ljava/lang/Object;>(TT;)TT;",
            )
            .method("toString", STATIC, "(Ljava/lang/Object;)Ljava/lang/String;")
            .build(),
        class("java.util.Collections", OBJECT_HEADER)
            .method(
                "emptyList",
                STATIC,
                "<T:Ljava/lang/Object;>()Ljava/util/List<TT;>;",
            )
            .method(
                "singletonList",
                STATIC,
                "<T:Ljava/lang/Object;>(TT;)Ljava/util/List<TT;>;",
            )
            .method(
                "sort",
                STATIC,
                "<T::Ljava/lang/Comparable<-TT;>;>(Ljava/util/List<TT;>;)V",
            )
            .method(
                "unmodifiableList",
                STATIC,
                "<T:Ljava/lang/Object;>(Ljava/util/List<+TT;>;)Ljava/util/List<TT;>;",
            )
            .build(),
        interface(
            "java.util.concurrent.Callable",
            "<V:Ljava/lang/Object;>Ljava/lang/Object;",
        )
        .method("call", ABSTRACT, "()TV;")
        .build(),
        // java.util.function
        interface(
            "java.util.function.Function",
            "<T:Ljava/lang/Object;R:Ljava/lang/Object;>Ljava/lang/Object;",
        )
        .method("apply", ABSTRACT, "(TT;)TR;")
        .method(
            "andThen",
            PUB,
            "<V:Ljava/lang/Object;>(Ljava/util/function/Function<-TR;+TV;>;)Ljava/util/function/Function<TT;TV;>;",
        )
        .method(
            "identity",
            STATIC,
            "<T:Ljava/lang/Object;>()Ljava/util/function/Function<TT;TT;>;",
        )
        .build(),
        interface(
            "java.util.function.BiFunction",
            "<T:Ljava/lang/Object;U:Ljava/lang/Object;R:Ljava/lang/Object;>Ljava/lang/Object;",
        )
        .method("apply", ABSTRACT, "(TT;TU;)TR;")
        .build(),
        interface(
            "java.util.function.Supplier",
            "<T:Ljava/lang/Object;>Ljava/lang/Object;",
        )
        .method("get", ABSTRACT, "()TT;")
        .build(),
        interface(
            "java.util.function.Consumer",
            "<T:Ljava/lang/Object;>Ljava/lang/Object;",
        )
        .method("accept", ABSTRACT, "(TT;)V")
        .build(),
        interface(
            "java.util.function.BiConsumer",
            "<T:Ljava/lang/Object;U:Ljava/lang/Object;>Ljava/lang/Object;",
        )
        .method("accept", ABSTRACT, "(TT;TU;)V")
        .build(),
        interface(
            "java.util.function.Predicate",
            "<T:Ljava/lang/Object;>Ljava/lang/Object;",
        )
        .method("test", ABSTRACT, "(TT;)Z")
        .method("negate", PUB, "()Ljava/util/function/Predicate<TT;>;")
        .build(),
        interface(
            "java.util.function.UnaryOperator",
            "<T:Ljava/lang/Object;>Ljava/lang/Object;Ljava/util/function/Function<TT;TT;>;",
        )
        .method(
            "identity",
            STATIC,
            "<T:Ljava/lang/Object;>()Ljava/util/function/UnaryOperator<TT;>;",
        )
        .build(),
        interface(
            "java.util.function.BinaryOperator",
            "<T:Ljava/lang/Object;>Ljava/lang/Object;Ljava/util/function/BiFunction<TT;TT;TT;>;",
        )
        .build(),
        // java.util.stream
        interface(
            "java.util.stream.Stream",
            "<T:Ljava/lang/Object;>Ljava/lang/Object;",
        )
        .method(
            "map",
            ABSTRACT,
            "<R:Ljava/lang/Object;>(Ljava/util/function/Function<-TT;+TR;>;)Ljava/util/stream/Stream<TR;>;",
        )
        .method(
            "filter",
            ABSTRACT,
            "(Ljava/util/function/Predicate<-TT;>;)Ljava/util/stream/Stream<TT;>;",
        )
        .method("forEach", ABSTRACT, "(Ljava/util/function/Consumer<-TT;>;)V")
        .method("count", ABSTRACT, "()J")
        .method(
            "reduce",
            ABSTRACT,
            "(TT;Ljava/util/function/BinaryOperator<TT;>;)TT;",
        )
        .method("toList", PUB, "()Ljava/util/List<TT;>;")
        .method(
            "sorted",
            ABSTRACT,
            "(Ljava/util/Comparator<-TT;>;)Ljava/util/stream/Stream<TT;>;",
        )
        .method(
            "of",
            STATIC_VARARGS,
            "<T:Ljava/lang/Object;>([TT;)Ljava/util/stream/Stream<TT;>;",
        )
        .build(),
    ];
    out.sort_by(|a, b| a.name.cmp(&b.name));
    out
}
