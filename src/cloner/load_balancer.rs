use aws_sdk_elasticloadbalancingv2::types::LoadBalancer;
use log::debug;

use crate::elb::{ElbApi, LoadBalancerSpec};
use crate::types::CopyError;

/// Creates a copy of the source load balancer under `dest_name`.
///
/// The create request carries scheme, type, security groups and IP address
/// type; server-assigned fields (ARN, DNS name, hosted zone, VPC, state,
/// timestamps) are not echoed back. Subnets are taken from the source's
/// availability zones, order preserved.
pub async fn clone_load_balancer(
    api: &dyn ElbApi,
    source_lb_arn: &str,
    dest_name: &str,
) -> Result<LoadBalancer, CopyError> {
    let source = api.describe_load_balancer(source_lb_arn).await?;
    debug!("Cloning load balancer {} as {}", source_lb_arn, dest_name);
    let subnets = source
        .availability_zones
        .unwrap_or_default()
        .into_iter()
        .filter_map(|az| az.subnet_id)
        .collect();
    let spec = LoadBalancerSpec {
        name: dest_name.to_string(),
        subnets,
        security_groups: source.security_groups.unwrap_or_default(),
        scheme: source.scheme,
        lb_type: source.r#type,
        ip_address_type: source.ip_address_type,
    };
    api.create_load_balancer(spec).await
}
