//! Display groups and argument ordering.
//!
//! Without group configuration, required arguments are listed under
//! [`REQUIRED_TITLE`] and the rest under [`OPTIONAL_TITLE`]. A configured
//! group claims its members; the group that lists `help` replaces the
//! optional title.

use lazyarg_core::{Argument, ConfigError, GroupSpec, GroupToken, Result, group_token};

pub const REQUIRED_TITLE: &str = "Required arguments";
pub const OPTIONAL_TITLE: &str = "Optional arguments";

/// Title of the group that holds optional arguments and `help`.
pub fn optional_title(groups: &[GroupSpec]) -> &str {
    groups
        .iter()
        .find(|g| g.holds_help())
        .map_or(OPTIONAL_TITLE, |g| g.name.as_str())
}

/// Sets [`Argument::group`] on every argument.
///
/// When a name is listed by several groups, the first one wins.
pub fn assign_groups(arguments: &mut [Argument], groups: &[GroupSpec]) {
    let optional = optional_title(groups).to_string();
    for arg in arguments.iter_mut() {
        arg.group = match groups.iter().find(|g| g.contains(&arg.name)) {
            Some(group) => group.name.clone(),
            None if arg.is_required() => REQUIRED_TITLE.to_string(),
            None => optional.clone(),
        };
    }
}

/// Computes the display order as indices into `arguments`.
///
/// Groups are compared by their sanitized token: configured groups use the
/// token from `tokens` (see [`Environment::validate`]), any other label is
/// sanitized with [`group_token`].
///
/// `arguments` must be in declaration order. Without groups or an explicit
/// order, that order is kept. Otherwise the leading groups (the explicit
/// order, or the configured groups) come first with their members in
/// declaration order, then every other group, in order of first
/// appearance, sorted by argument name.
///
/// # Errors
///
/// [`ConfigError::UnknownGroupInOrder`] if `explicit` names a group that is
/// neither configured nor used by any argument.
///
/// [`Environment::validate`]: lazyarg_core::Environment::validate
pub fn display_order(
    arguments: &[Argument],
    tokens: &[GroupToken],
    explicit: Option<&[String]>,
) -> Result<Vec<usize>> {
    if tokens.is_empty() && explicit.is_none() {
        return Ok((0..arguments.len()).collect());
    }

    let keys: Vec<String> = arguments
        .iter()
        .map(|arg| group_key(&arg.group, tokens))
        .collect::<Result<_>>()?;

    let leading: Vec<String> = match explicit {
        Some(order) => order
            .iter()
            .map(|name| -> Result<String> {
                let key = group_key(name, tokens)
                    .map_err(|_| ConfigError::UnknownGroupInOrder(name.clone()))?;
                let known = tokens.iter().any(|t| t.token == key) || keys.contains(&key);
                if known {
                    Ok(key)
                } else {
                    Err(ConfigError::UnknownGroupInOrder(name.clone()))
                }
            })
            .collect::<Result<_>>()?,
        None => tokens.iter().map(|t| t.token.clone()).collect(),
    };

    let mut placed = vec![false; arguments.len()];
    let mut order = Vec::with_capacity(arguments.len());

    for key in &leading {
        for (index, arg_key) in keys.iter().enumerate() {
            if !placed[index] && arg_key == key {
                placed[index] = true;
                order.push(index);
            }
        }
    }

    let mut rest: Vec<&str> = Vec::new();
    for (index, key) in keys.iter().enumerate() {
        if !placed[index] && !rest.contains(&key.as_str()) {
            rest.push(key);
        }
    }
    for key in rest {
        let mut members: Vec<usize> = (0..arguments.len())
            .filter(|&i| !placed[i] && keys[i] == key)
            .collect();
        members.sort_by(|&a, &b| arguments[a].name.cmp(&arguments[b].name));
        for &i in &members {
            placed[i] = true;
        }
        order.extend(members);
    }

    Ok(order)
}

/// Internal key of a group label.
fn group_key(label: &str, tokens: &[GroupToken]) -> Result<String> {
    match tokens.iter().find(|t| t.name == label) {
        Some(known) => Ok(known.token.clone()),
        None => group_token(label),
    }
}
