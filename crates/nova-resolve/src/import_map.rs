use nova_core::{Name, QualifiedName};
use nova_hir::ImportDecl;

/// The imports of one compilation unit, grouped by form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportMap {
    pub type_single: Vec<TypeSingleImport>,
    pub type_star: Vec<TypeStarImport>,
    pub static_single: Vec<StaticSingleImport>,
    pub static_star: Vec<StaticStarImport>,
}

impl ImportMap {
    #[must_use]
    pub fn from_imports(imports: &[ImportDecl]) -> Self {
        let mut out = ImportMap::default();

        for import in imports {
            match import {
                ImportDecl::Single(path) => {
                    let Some(imported) = path.last().cloned() else {
                        continue;
                    };
                    out.type_single.push(TypeSingleImport {
                        path: path.clone(),
                        imported,
                    });
                }
                ImportDecl::OnDemand(path) => {
                    if path.is_empty() {
                        continue;
                    }
                    out.type_star.push(TypeStarImport { path: path.clone() });
                }
                ImportDecl::StaticSingle { ty, member } => {
                    if ty.is_empty() {
                        continue;
                    }
                    out.static_single.push(StaticSingleImport {
                        ty: ty.clone(),
                        member: member.clone(),
                    });
                }
                ImportDecl::StaticOnDemand(ty) => {
                    if ty.is_empty() {
                        continue;
                    }
                    out.static_star.push(StaticStarImport { ty: ty.clone() });
                }
            }
        }

        out
    }

    pub fn is_empty(&self) -> bool {
        self.type_single.is_empty()
            && self.type_star.is_empty()
            && self.static_single.is_empty()
            && self.static_star.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSingleImport {
    pub path: QualifiedName,
    /// The simple name the import makes visible.
    pub imported: Name,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeStarImport {
    /// `import X.*;` where `X` names either a package (`java.util`) or a
    /// type whose member types are imported (`java.util.Map`).
    pub path: QualifiedName,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticSingleImport {
    pub ty: QualifiedName,
    pub member: Name,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticStarImport {
    pub ty: QualifiedName,
}
