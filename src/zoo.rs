//! Reference listing of the model zoo, grouped by model family.

use std::fmt::Write;

/// Root package of every listed module.
pub const ZOO_ROOT: &str = "rl4co.models.zoo";

/// A model family and the modules that implement it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Family {
    pub key: &'static str,
    pub title: &'static str,
    pub modules: &'static [&'static str],
}

impl Family {
    /// Fully qualified path of every module in this family.
    pub fn module_paths(&self) -> impl Iterator<Item = String> + '_ {
        self.modules
            .iter()
            .map(move |module| format!("{ZOO_ROOT}.{}.{module}", self.key))
    }
}

const FAMILIES: &[Family] = &[
    Family {
        key: "am",
        title: "Attention Model (AM)",
        modules: &["model", "policy", "encoder", "decoder"],
    },
    Family {
        key: "amppo",
        title: "Attention Model with critic baseline (AM-PPO)",
        modules: &["model", "policy"],
    },
    Family {
        key: "pomo",
        title: "Policy Optimization with Multiple Optima (POMO)",
        modules: &["model", "policy", "utils"],
    },
    Family {
        key: "symnco",
        title: "Symmetric Neural Combinatorial Optimization (SymNCO)",
        modules: &["model", "policy", "losses", "augmentations"],
    },
    Family {
        key: "ptrnet",
        title: "Pointer Network",
        modules: &["model", "policy", "encoder", "decoder", "critic"],
    },
    Family {
        key: "ham",
        title: "Heterogeneous Attention Model (HAM)",
        modules: &["model", "policy", "encoder", "attention"],
    },
];

/// Every family, in listing order.
pub fn families() -> &'static [Family] {
    FAMILIES
}

/// Looks up a family by its key.
pub fn family(key: &str) -> Option<&'static Family> {
    FAMILIES.iter().find(|f| f.key == key)
}

/// Output layout of [`render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// A heading per family and a bullet per module.
    Markdown,
    /// One fully qualified module path per line.
    Plain,
}

/// Renders the reference page.
pub fn render(format: Format) -> String {
    let mut out = String::new();

    match format {
        Format::Markdown => {
            out.push_str("# Model Zoo\n");
            for family in FAMILIES {
                let _ = write!(out, "\n## {}\n\n", family.title);
                for path in family.module_paths() {
                    let _ = writeln!(out, "- `{path}`");
                }
            }
        }
        Format::Plain => {
            for path in FAMILIES.iter().flat_map(|f| f.module_paths()) {
                out.push_str(&path);
                out.push('\n');
            }
        }
    }

    out
}
