//! Prompt loader for YAML prompt definitions.

use crate::types::PromptDefinition;
use heavyrag_core::{AppError, AppResult};
use std::path::Path;

/// Variables every template must reference.
const REQUIRED_VARIABLES: [&str; 2] = ["context", "question"];

/// Load a prompt definition by ID from the workspace.
///
/// Looks for `<id>.yml` in the `.heavyrag/prompts/` directory.
///
/// # Example
/// ```no_run
/// use heavyrag_prompt::load_prompt;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Path::new("."), "machinery.detailed")?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(workspace_path: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = workspace_path
        .join(".heavyrag/prompts")
        .join(format!("{}.yml", prompt_id));

    tracing::debug!("Loading prompt from: {:?}", prompt_file);

    if !prompt_file.exists() {
        return Err(AppError::Prompt(format!(
            "Prompt file not found: {:?}",
            prompt_file
        )));
    }

    let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to read prompt file {:?}: {}",
            prompt_file, e
        ))
    })?;

    let definition: PromptDefinition = serde_yaml::from_str(&contents).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to parse prompt YAML {:?}: {}",
            prompt_file, e
        ))
    })?;

    validate_prompt(&definition)?;

    tracing::info!("Loaded prompt: {} ({})", definition.id, definition.title);

    Ok(definition)
}

/// Resolve the prompt to use: the configured definition if an id is given,
/// otherwise the built-in one.
pub fn resolve_prompt(workspace_path: &Path, prompt_id: Option<&str>) -> AppResult<PromptDefinition> {
    match prompt_id {
        Some(id) => load_prompt(workspace_path, id),
        None => Ok(PromptDefinition::machinery_default()),
    }
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.title.is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    for variable in REQUIRED_VARIABLES {
        if !def.template.contains(&format!("{{{{{}}}}}", variable)) {
            return Err(AppError::Prompt(format!(
                "Prompt template must reference {{{{{}}}}}",
                variable
            )));
        }
    }

    Ok(())
}
