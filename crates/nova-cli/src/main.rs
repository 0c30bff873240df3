use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use nova_classpath::{ClasspathEntry, ClasspathIndex};
use nova_config::NovaConfig;
use nova_core::TypeName;
use nova_types::{ClassDef, ClassKind, LayeredEnv, MethodDef, Nesting, TypeEnv, TypeStore};
use nova_types_bridge::ClasspathTypeEnv;

const DEFAULT_CONFIG: &str = "nova.toml";

#[derive(Parser)]
#[command(name = "nova", version, about = "Nova CLI (classpath queries, class inspection)")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct GlobalArgs {
    /// Config file (defaults to `nova.toml` in the current directory, if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Extra classpath entries, appended after the configured ones. Accepts
    /// the platform path-list syntax and may be repeated.
    #[arg(long = "classpath", visible_alias = "cp", global = true)]
    classpath: Vec<OsString>,
    /// Log level or `EnvFilter` directives, overriding the config
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// Emit JSON suitable for CI
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Locate the class file of a binary class name (`java.util.Map$Entry`)
    Find(FindArgs),
    /// List the resources directly inside a package, across the classpath
    Ls(LsArgs),
    /// Print the members of a class, read from the classpath or the built-in JDK model
    Class(ClassArgs),
}

#[derive(Args)]
struct FindArgs {
    binary_name: String,
}

#[derive(Args)]
struct LsArgs {
    /// Dotted package name; empty for the default package
    #[arg(default_value = "")]
    package: String,
}

#[derive(Args)]
struct ClassArgs {
    binary_name: String,
    /// Do not fall back to the built-in JDK model
    #[arg(long)]
    no_jdk_model: bool,
}

fn main() {
    let cli = Cli::parse();
    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            2
        }
    };

    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<i32> {
    let mut config = load_config(cli.global.config.as_deref())?;
    if let Some(level) = cli.global.log_level.clone() {
        config.logging.level = level;
    }
    let _logs = nova_config::init_tracing(&config.logging);
    let index = Arc::new(classpath_index(&config, &cli.global.classpath));
    let json = cli.global.json;

    match cli.command {
        Command::Find(args) => {
            let path = TypeName::new(args.binary_name.as_str()).to_class_file_path();
            let found = index
                .find_resource(&path)
                .with_context(|| format!("failed to search the classpath for {}", args.binary_name))?;
            let Some(location) = found else {
                if json {
                    print_json(&serde_json::json!({ "found": false }))?;
                } else {
                    eprintln!("not found: {}", args.binary_name);
                }
                return Ok(1);
            };
            let report = FindReport {
                found: true,
                entry: location.entry.path().to_path_buf(),
                path: location.path,
            };
            if json {
                print_json(&report)?;
            } else {
                println!("{}: {}", report.entry.display(), report.path);
            }
            Ok(0)
        }
        Command::Ls(args) => {
            let classes = index
                .list_package_contents(&args.package)
                .with_context(|| format!("failed to list package `{}`", args.package))?;
            if json {
                print_json(&classes)?;
            } else {
                for class in &classes {
                    println!("{class}");
                }
            }
            Ok(if classes.is_empty() { 1 } else { 0 })
        }
        Command::Class(args) => {
            let mut env = LayeredEnv::new().with_layer(ClasspathTypeEnv::new(index));
            if !args.no_jdk_model {
                env = env.with_layer(TypeStore::with_minimal_jdk());
            }
            let def = env
                .class(&args.binary_name)
                .with_context(|| format!("failed to load class {}", args.binary_name))?;
            let report = ClassReport::new(&def);
            if json {
                print_json(&report)?;
            } else {
                print_class(&report);
            }
            Ok(0)
        }
    }
}

/// The explicit config file, else `nova.toml` when it exists, else defaults.
fn load_config(explicit: Option<&Path>) -> Result<NovaConfig> {
    if let Some(path) = explicit {
        return NovaConfig::load_from_path(path)
            .with_context(|| format!("failed to load config {}", path.display()));
    }
    let fallback = Path::new(DEFAULT_CONFIG);
    if fallback.is_file() {
        return NovaConfig::load_from_path(fallback)
            .with_context(|| format!("failed to load config {}", fallback.display()));
    }
    Ok(NovaConfig::default())
}

/// Boot entries form the parent index, consulted before the application
/// entries.
fn classpath_index(config: &NovaConfig, extra: &[OsString]) -> ClasspathIndex {
    let entries: Vec<ClasspathEntry> = config
        .classpath
        .entries
        .iter()
        .cloned()
        .chain(extra.iter().flat_map(std::env::split_paths))
        .map(ClasspathEntry::from_path)
        .collect();
    tracing::debug!(
        target: "nova.cli",
        entries = entries.len(),
        boot = config.classpath.boot.len(),
        "building classpath index"
    );
    let index = ClasspathIndex::new(entries);
    if config.classpath.boot.is_empty() {
        return index;
    }
    let boot = config
        .classpath
        .boot
        .iter()
        .cloned()
        .map(ClasspathEntry::from_path)
        .collect();
    index.with_parent(Arc::new(ClasspathIndex::new(boot)))
}

#[derive(Serialize)]
struct FindReport {
    found: bool,
    entry: PathBuf,
    path: String,
}

#[derive(Serialize)]
struct ClassReport {
    name: String,
    kind: &'static str,
    nesting: &'static str,
    type_params: Vec<String>,
    super_class: Option<String>,
    interfaces: Vec<String>,
    fields: Vec<String>,
    constructors: Vec<String>,
    methods: Vec<String>,
    member_classes: Vec<String>,
}

impl ClassReport {
    fn new(def: &ClassDef) -> Self {
        let kind = match def.kind {
            ClassKind::Class if def.is_abstract => "abstract class",
            ClassKind::Class => "class",
            ClassKind::Interface => "interface",
            ClassKind::Enum => "enum",
            ClassKind::Annotation => "annotation",
        };
        let nesting = match def.nesting {
            Nesting::TopLevel => "top-level",
            Nesting::Member { is_static: true } => "static member",
            Nesting::Member { is_static: false } => "inner",
            Nesting::Local => "local",
            Nesting::Anonymous => "anonymous",
        };
        let type_params = def
            .type_params
            .iter()
            .map(|p| {
                let bounds: Vec<String> = p
                    .bounds
                    .iter()
                    .filter(|b| !b.is_object())
                    .map(ToString::to_string)
                    .collect();
                if bounds.is_empty() {
                    p.name.clone()
                } else {
                    format!("{} extends {}", p.name, bounds.join(" & "))
                }
            })
            .collect();
        let fields = def
            .fields
            .iter()
            .map(|f| {
                let prefix = if f.is_static { "static " } else { "" };
                format!("{prefix}{} {}", f.ty, f.name)
            })
            .collect();
        Self {
            name: def.name.clone(),
            kind,
            nesting,
            type_params,
            super_class: def.super_class.as_ref().map(ToString::to_string),
            interfaces: def.interfaces.iter().map(ToString::to_string).collect(),
            fields,
            constructors: def
                .constructors
                .iter()
                .map(|c| method_line(c, def.simple_name()))
                .collect(),
            methods: def
                .methods
                .iter()
                .filter(|m| !m.is_bridge && !m.is_synthetic)
                .map(|m| method_line(m, &m.name))
                .collect(),
            member_classes: def.member_classes.clone(),
        }
    }
}

fn method_line(method: &MethodDef, name: &str) -> String {
    let mut out = String::new();
    if method.is_static {
        out.push_str("static ");
    }
    if method.is_abstract {
        out.push_str("abstract ");
    }
    if !method.type_params.is_empty() {
        let names: Vec<&str> = method.type_params.iter().map(|p| p.name.as_str()).collect();
        out.push_str(&format!("<{}> ", names.join(", ")));
    }
    if method.name != "<init>" {
        out.push_str(&format!("{} ", method.return_type));
    }
    let mut params: Vec<String> = method.params.iter().map(ToString::to_string).collect();
    if method.is_varargs {
        if let Some(last) = params.last_mut() {
            if let Some(element) = last.strip_suffix("[]") {
                *last = format!("{element}...");
            }
        }
    }
    out.push_str(&format!("{name}({})", params.join(", ")));
    out
}

fn print_class(report: &ClassReport) {
    let mut header = format!("{} {}", report.kind, report.name);
    if !report.type_params.is_empty() {
        header.push_str(&format!("<{}>", report.type_params.join(", ")));
    }
    println!("{header}");
    println!("  nesting: {}", report.nesting);
    if let Some(super_class) = &report.super_class {
        println!("  extends: {super_class}");
    }
    if !report.interfaces.is_empty() {
        println!("  implements: {}", report.interfaces.join(", "));
    }
    for (label, lines) in [
        ("fields", &report.fields),
        ("constructors", &report.constructors),
        ("methods", &report.methods),
        ("member classes", &report.member_classes),
    ] {
        if lines.is_empty() {
            continue;
        }
        println!("  {label}:");
        for line in lines {
            println!("    {line}");
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value)?;
    println!("{out}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use nova_types::SymbolType;

    use super::*;

    #[test]
    fn method_lines_read_like_declarations() {
        let mut of = MethodDef::new(
            "of",
            vec![SymbolType::type_variable("E", vec![SymbolType::object()]).array_of(1)],
            SymbolType::parameterized("java.util.List", vec![SymbolType::type_variable("E", vec![SymbolType::object()])]),
        );
        of.is_static = true;
        of.is_varargs = true;
        of.type_params = vec![nova_types::TypeParamDef::new("E", Vec::new())];
        assert_eq!(method_line(&of, "of"), "static <E> java.util.List<E> of(E...)");

        let ctor = MethodDef::new("<init>", vec![SymbolType::int()], SymbolType::void());
        assert_eq!(method_line(&ctor, "ArrayList"), "ArrayList(int)");
    }

    #[test]
    fn jdk_model_classes_report_their_shape() {
        let jdk = TypeStore::with_minimal_jdk();
        let def = jdk.class("java.util.ArrayList").unwrap();
        let report = ClassReport::new(&def);
        assert_eq!(report.kind, "class");
        assert_eq!(report.type_params, vec!["E".to_string()]);
        assert_eq!(report.super_class.as_deref(), Some("java.lang.Object"));
        assert!(report.interfaces.contains(&"java.util.List<E>".to_string()));
        assert!(report.constructors.contains(&"ArrayList()".to_string()));
    }
}
