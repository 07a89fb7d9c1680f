//! Default merging.

use crate::error::TemplateResult;
use crate::loader::TemplateLoader;
use crate::value::ConfigMap;

/// Inject every default key missing from `config`. Keys already present win,
/// even when their value is null. Missing keys are appended in defaults order.
pub fn merge_defaults(mut config: ConfigMap, defaults: &ConfigMap) -> ConfigMap {
    for (key, value) in defaults {
        if !config.contains_key(key) {
            config.insert(key.clone(), value.clone());
        }
    }
    config
}

/// Merge the stored defaults of `type_name` into `config`.
pub fn apply_defaults(
    loader: &TemplateLoader,
    type_name: &str,
    config: ConfigMap,
) -> TemplateResult<ConfigMap> {
    Ok(match loader.load_defaults(type_name)? {
        Some(defaults) => merge_defaults(config, &defaults),
        None => config,
    })
}
