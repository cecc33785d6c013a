//! Minimal ARN parsing. The copy logic only ever needs the resource type and
//! the resource name out of a target-group ARN, but parsing the full shape
//! lets us reject garbage with a useful message instead of slicing blindly.

use crate::types::CopyError;

/// The pieces of an ARN we care about, borrowed from the input string.
///
/// `arn:partition:service:region:account:resource-type/resource-id[/qualifier]`
#[derive(Debug, PartialEq, Eq)]
pub struct Arn<'a> {
    pub partition: &'a str,
    pub service: &'a str,
    pub region: &'a str,
    pub account: &'a str,
    pub resource_type: &'a str,
    pub resource_id: &'a str,
}

pub fn parse(arn: &str) -> Result<Arn<'_>, CopyError> {
    let parts: Vec<&str> = arn.splitn(6, ':').collect();
    if parts.len() != 6 || parts[0] != "arn" {
        return Err(CopyError::Malformed {
            msg: format!("not an ARN: {}", arn),
        });
    }
    let resource: Vec<&str> = parts[5].split('/').collect();
    if resource.len() < 2 {
        return Err(CopyError::Malformed {
            msg: format!("ARN resource part has no id segment: {}", arn),
        });
    }
    Ok(Arn {
        partition: parts[1],
        service: parts[2],
        region: parts[3],
        account: parts[4],
        resource_type: resource[0],
        resource_id: resource[1],
    })
}

/// Extracts the target-group name embedded in a target-group ARN.
pub fn target_group_name(arn: &str) -> Result<&str, CopyError> {
    let parsed = parse(arn)?;
    if parsed.resource_type != "targetgroup" {
        return Err(CopyError::Malformed {
            msg: format!("not a target-group ARN: {}", arn),
        });
    }
    Ok(parsed.resource_id)
}
