use crate::error::Error;
use log::debug;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// Deploy-plan mini-language.
///
/// A `@custom:deploy-plan` annotation carries a single-line JSON array
/// describing the deployment sequence of an example and its dependencies:
///
/// ```json
/// [{"contract":"IdentityRegistry","saveAs":"registry"},
///  {"contract":"ConfidentialToken","args":["@registry",1000,"$deployer"]}]
/// ```
///
/// String arguments are discriminated by their first character: `@name`
/// references an earlier step's deployed address, the exact string
/// `$deployer` stands for the transaction sender, `#code` passes a raw
/// expression through to the generated deploy script, anything else is a
/// literal. This is the one annotation the pipeline fails hard on: a
/// broken plan would otherwise silently produce a broken scaffold.

/// One normalized constructor argument of a deploy step.
#[derive(Debug, Clone, PartialEq)]
pub enum DeployArg {
    /// Address of an earlier step, by save-name or contract name (`@name`)
    Ref(String),
    /// Signer placeholder (`$deployer`)
    Signer(String),
    /// Raw expression passed through to the deploy script (`#code`)
    Expr(String),
    /// String literal
    Str(String),
    /// Numeric literal, kept as written
    Num(serde_json::Number),
}

/// One normalized step of a deploy plan.
#[derive(Debug, Clone, PartialEq)]
pub struct DeployStep {
    /// Contract to deploy
    pub contract: String,
    /// Constructor arguments, in order
    pub args: Vec<DeployArg>,
    /// Name later steps may reference this deployment by
    pub save_as: Option<String>,
    /// Statements emitted verbatim after the deployment call
    pub after_deploy: Vec<String>,
}

impl DeployStep {
    /// The name this step is referenceable by: its save-name if present,
    /// else its contract name.
    pub fn reference_name(&self) -> &str {
        self.save_as.as_deref().unwrap_or(&self.contract)
    }
}

/// Wire format of a step as authored in the annotation.
#[derive(Debug, Deserialize)]
struct RawStep {
    contract: String,
    #[serde(default)]
    args: Vec<serde_json::Value>,
    #[serde(rename = "saveAs")]
    save_as: Option<String>,
    #[serde(rename = "afterDeploy", default)]
    after_deploy: Vec<String>,
}

/// Parses and validates a deploy-plan annotation value.
///
/// `file` names the contract carrying the annotation and appears in every
/// diagnostic.
///
/// # Errors
///
/// Returns [`Error::MalformedDeployPlan`] if the value is not a JSON array
/// of step objects or an argument has an unsupported type, and
/// [`Error::ForwardDeployReference`] if a `@ref` argument names a step that
/// is not strictly earlier in the plan.
pub fn parse_deploy_plan(raw: &str, file: &Path) -> Result<Vec<DeployStep>, Error> {
    debug!("parsing deploy plan for {}", file.display());

    let raw_steps: Vec<RawStep> =
        serde_json::from_str(raw).map_err(|e| Error::MalformedDeployPlan {
            file: file.to_path_buf(),
            message: e.to_string(),
        })?;

    let mut steps = Vec::with_capacity(raw_steps.len());
    let mut known: HashSet<String> = HashSet::new();

    for raw_step in raw_steps {
        let mut args = Vec::with_capacity(raw_step.args.len());
        for value in raw_step.args {
            args.push(normalize_arg(value, file)?);
        }

        // A reference must resolve to a step deployed before this one.
        for arg in &args {
            if let DeployArg::Ref(name) = arg {
                if !known.contains(name) {
                    return Err(Error::ForwardDeployReference {
                        file: file.to_path_buf(),
                        reference: name.clone(),
                    });
                }
            }
        }

        known.insert(raw_step.contract.clone());
        if let Some(save_as) = &raw_step.save_as {
            known.insert(save_as.clone());
        }

        steps.push(DeployStep {
            contract: raw_step.contract,
            args,
            save_as: raw_step.save_as,
            after_deploy: raw_step.after_deploy,
        });
    }

    Ok(steps)
}

fn normalize_arg(value: serde_json::Value, file: &Path) -> Result<DeployArg, Error> {
    match value {
        serde_json::Value::String(s) => {
            if let Some(name) = s.strip_prefix('@') {
                Ok(DeployArg::Ref(name.to_string()))
            } else if let Some(name) = s.strip_prefix('$') {
                if name == "deployer" {
                    Ok(DeployArg::Signer(name.to_string()))
                } else {
                    // Only $deployer is a signer placeholder; any other
                    // $-string is a plain literal.
                    Ok(DeployArg::Str(s))
                }
            } else if let Some(code) = s.strip_prefix('#') {
                Ok(DeployArg::Expr(code.to_string()))
            } else {
                Ok(DeployArg::Str(s))
            }
        }
        serde_json::Value::Number(n) => Ok(DeployArg::Num(n)),
        other => Err(Error::MalformedDeployPlan {
            file: file.to_path_buf(),
            message: format!("unsupported argument {} (expected string or number)", other),
        }),
    }
}

/// Renders an argument back to its annotation sigil form.
///
/// Round-trips exactly: `@f`, `$deployer`, `#Date.now()`, `"literal"`, `42`.
pub fn render_arg(arg: &DeployArg) -> String {
    match arg {
        DeployArg::Ref(name) => format!("@{}", name),
        DeployArg::Signer(name) => format!("${}", name),
        DeployArg::Expr(code) => format!("#{}", code),
        DeployArg::Str(s) => serde_json::to_string(s).unwrap_or_else(|_| s.clone()),
        DeployArg::Num(n) => n.to_string(),
    }
}
