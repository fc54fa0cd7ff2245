use std::path::PathBuf;

/// Error types for the pipeline's hard failure modes.
///
/// Soft failures (unresolvable dependency names, missing test files) never
/// surface here; they degrade into warnings or empty sets at the call site.
/// Everything else flows through `anyhow` and converts at the boundary.
#[derive(Debug)]
pub enum Error {
    /// A `@custom:deploy-plan` annotation that is not valid JSON.
    MalformedDeployPlan { file: PathBuf, message: String },
    /// A `@ref` argument pointing at a step that has not been deployed yet.
    ForwardDeployReference { file: PathBuf, reference: String },
    /// Scaffold target already contains files.
    OutputDirNotEmpty(PathBuf),
    /// No scaffold template found after exhausting the fallback chain.
    TemplateNotFound { searched: Vec<PathBuf> },
    /// CLI received a slug or category that is not in the registry.
    UnknownIdentifier {
        kind: &'static str,
        name: String,
        valid: Vec<String>,
    },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::MalformedDeployPlan { file, message } => {
                write!(
                    f,
                    "Malformed @custom:deploy-plan annotation in {}: {}",
                    file.display(),
                    message
                )
            }
            Error::ForwardDeployReference { file, reference } => {
                write!(
                    f,
                    "Deploy plan in {} references \"@{}\" before any earlier step saves or deploys it",
                    file.display(),
                    reference
                )
            }
            Error::OutputDirNotEmpty(dir) => {
                write!(
                    f,
                    "Output directory {} already exists and is not empty; refusing to overwrite",
                    dir.display()
                )
            }
            Error::TemplateNotFound { searched } => {
                writeln!(f, "No scaffold template found. Searched:")?;
                for path in searched {
                    writeln!(f, "  - {}", path.display())?;
                }
                write!(
                    f,
                    "Run `git submodule update --init` in the repository root, \
                     or pass --template <dir> pointing at a Hardhat template project"
                )
            }
            Error::UnknownIdentifier { kind, name, valid } => {
                writeln!(f, "Unknown {}: \"{}\". Valid choices:", kind, name)?;
                for choice in valid {
                    writeln!(f, "  - {}", choice)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for Error {}
