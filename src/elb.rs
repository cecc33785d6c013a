//! The slice of the ELBv2 control plane the copy run consumes, behind a trait
//! so the cloners can be driven by a fake in tests. `SdkElb` is the real
//! implementation on top of the AWS SDK client.
//!
//! Create requests are explicit structs carrying only the fields we are
//! allowed to send - the describe outputs carry server-assigned fields (ARNs,
//! state, timestamps) that must never be echoed back into a create call.

use async_trait::async_trait;
use aws_sdk_elasticloadbalancingv2::types::{
    Action, Certificate, IpAddressType, Listener, LoadBalancer, LoadBalancerSchemeEnum,
    LoadBalancerTypeEnum, Matcher, ProtocolEnum, Rule, RuleCondition, TargetGroup, TargetTypeEnum,
};
use aws_sdk_elasticloadbalancingv2::Client as ELBv2Client;
use log::debug;

use crate::types::CopyError;

/// Create request for a load balancer, derived from a source load balancer
/// with the server-assigned fields dropped.
#[derive(Debug, Clone)]
pub struct LoadBalancerSpec {
    pub name: String,
    pub subnets: Vec<String>,
    pub security_groups: Vec<String>,
    pub scheme: Option<LoadBalancerSchemeEnum>,
    pub lb_type: Option<LoadBalancerTypeEnum>,
    pub ip_address_type: Option<IpAddressType>,
}

/// Create request for a target group, derived from a source target group with
/// name, ARN and load-balancer associations dropped.
#[derive(Debug, Clone)]
pub struct TargetGroupSpec {
    pub name: String,
    pub protocol: Option<ProtocolEnum>,
    pub protocol_version: Option<String>,
    pub port: Option<i32>,
    pub vpc_id: Option<String>,
    pub target_type: Option<TargetTypeEnum>,
    pub health_check_protocol: Option<ProtocolEnum>,
    pub health_check_port: Option<String>,
    pub health_check_enabled: Option<bool>,
    pub health_check_path: Option<String>,
    pub health_check_interval_seconds: Option<i32>,
    pub health_check_timeout_seconds: Option<i32>,
    pub healthy_threshold_count: Option<i32>,
    pub unhealthy_threshold_count: Option<i32>,
    pub matcher: Option<Matcher>,
}

/// Create request for a listener on the destination load balancer.
#[derive(Debug, Clone)]
pub struct ListenerSpec {
    pub load_balancer_arn: String,
    pub protocol: Option<ProtocolEnum>,
    pub port: Option<i32>,
    pub ssl_policy: Option<String>,
    pub certificates: Vec<Certificate>,
    pub alpn_policy: Vec<String>,
    pub default_actions: Vec<Action>,
}

/// Create request for a rule on the destination listener.
#[derive(Debug, Clone)]
pub struct RuleSpec {
    pub listener_arn: String,
    pub priority: i32,
    pub conditions: Vec<RuleCondition>,
    pub actions: Vec<Action>,
}

/// One page of a rule listing.
#[derive(Debug)]
pub struct RulePage {
    pub rules: Vec<Rule>,
    pub next_marker: Option<String>,
}

/// The control-plane operations the copy run needs.
#[async_trait]
pub trait ElbApi {
    async fn describe_load_balancer(&self, arn: &str) -> Result<LoadBalancer, CopyError>;
    async fn create_load_balancer(&self, spec: LoadBalancerSpec)
        -> Result<LoadBalancer, CopyError>;
    /// Looks up a target group by exact name. Zero or multiple matches are
    /// both reported as not found.
    async fn describe_target_group(&self, name: &str) -> Result<TargetGroup, CopyError>;
    async fn create_target_group(&self, spec: TargetGroupSpec) -> Result<TargetGroup, CopyError>;
    async fn describe_listener(&self, arn: &str) -> Result<Listener, CopyError>;
    async fn create_listener(&self, spec: ListenerSpec) -> Result<Listener, CopyError>;
    async fn describe_rules(
        &self,
        listener_arn: &str,
        page_size: i32,
        marker: Option<String>,
    ) -> Result<RulePage, CopyError>;
    async fn create_rule(&self, spec: RuleSpec) -> Result<Rule, CopyError>;
}

pub struct SdkElb {
    client: ELBv2Client,
}

impl SdkElb {
    pub fn new(client: ELBv2Client) -> Self {
        SdkElb { client }
    }
}

#[async_trait]
impl ElbApi for SdkElb {
    async fn describe_load_balancer(&self, arn: &str) -> Result<LoadBalancer, CopyError> {
        debug!("Describing load balancer: {}", arn);
        let out = self
            .client
            .describe_load_balancers()
            .load_balancer_arns(arn)
            .send()
            .await
            .map_err(|err| CopyError::Remote(err.into()))?;
        out.load_balancers
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| CopyError::NotFound {
                resource: format!("load balancer {}", arn),
            })
    }

    async fn create_load_balancer(
        &self,
        spec: LoadBalancerSpec,
    ) -> Result<LoadBalancer, CopyError> {
        debug!("Creating load balancer: {}", spec.name);
        let out = self
            .client
            .create_load_balancer()
            .name(&spec.name)
            .set_subnets(Some(spec.subnets))
            .set_security_groups(none_if_empty(spec.security_groups))
            .set_scheme(spec.scheme)
            .set_type(spec.lb_type)
            .set_ip_address_type(spec.ip_address_type)
            .send()
            .await
            .map_err(|err| CopyError::Remote(err.into()))?;
        out.load_balancers
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| CopyError::NotFound {
                resource: format!("created load balancer {}", spec.name),
            })
    }

    async fn describe_target_group(&self, name: &str) -> Result<TargetGroup, CopyError> {
        debug!("Describing target group: {}", name);
        let out = self
            .client
            .describe_target_groups()
            .names(name)
            .send()
            .await
            .map_err(|err| CopyError::Remote(err.into()))?;
        let mut tgs = out.target_groups.unwrap_or_default();
        if tgs.len() != 1 {
            return Err(CopyError::NotFound {
                resource: format!("target group {} ({} matches)", name, tgs.len()),
            });
        }
        Ok(tgs.remove(0))
    }

    async fn create_target_group(&self, spec: TargetGroupSpec) -> Result<TargetGroup, CopyError> {
        debug!("Creating target group: {}", spec.name);
        let out = self
            .client
            .create_target_group()
            .name(&spec.name)
            .set_protocol(spec.protocol)
            .set_protocol_version(spec.protocol_version)
            .set_port(spec.port)
            .set_vpc_id(spec.vpc_id)
            .set_target_type(spec.target_type)
            .set_health_check_protocol(spec.health_check_protocol)
            .set_health_check_port(spec.health_check_port)
            .set_health_check_enabled(spec.health_check_enabled)
            .set_health_check_path(spec.health_check_path)
            .set_health_check_interval_seconds(spec.health_check_interval_seconds)
            .set_health_check_timeout_seconds(spec.health_check_timeout_seconds)
            .set_healthy_threshold_count(spec.healthy_threshold_count)
            .set_unhealthy_threshold_count(spec.unhealthy_threshold_count)
            .set_matcher(spec.matcher)
            .send()
            .await
            .map_err(|err| CopyError::Remote(err.into()))?;
        out.target_groups
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| CopyError::NotFound {
                resource: format!("created target group {}", spec.name),
            })
    }

    async fn describe_listener(&self, arn: &str) -> Result<Listener, CopyError> {
        debug!("Describing listener: {}", arn);
        let out = self
            .client
            .describe_listeners()
            .listener_arns(arn)
            .send()
            .await
            .map_err(|err| CopyError::Remote(err.into()))?;
        out.listeners
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| CopyError::NotFound {
                resource: format!("listener {}", arn),
            })
    }

    async fn create_listener(&self, spec: ListenerSpec) -> Result<Listener, CopyError> {
        debug!("Creating listener on: {}", spec.load_balancer_arn);
        let out = self
            .client
            .create_listener()
            .load_balancer_arn(&spec.load_balancer_arn)
            .set_protocol(spec.protocol)
            .set_port(spec.port)
            .set_ssl_policy(spec.ssl_policy)
            .set_certificates(none_if_empty(spec.certificates))
            .set_alpn_policy(none_if_empty(spec.alpn_policy))
            .set_default_actions(Some(spec.default_actions))
            .send()
            .await
            .map_err(|err| CopyError::Remote(err.into()))?;
        out.listeners
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| CopyError::NotFound {
                resource: format!("created listener on {}", spec.load_balancer_arn),
            })
    }

    async fn describe_rules(
        &self,
        listener_arn: &str,
        page_size: i32,
        marker: Option<String>,
    ) -> Result<RulePage, CopyError> {
        debug!("Describing rules for: {} (marker {:?})", listener_arn, marker);
        let out = self
            .client
            .describe_rules()
            .listener_arn(listener_arn)
            .page_size(page_size)
            .set_marker(marker)
            .send()
            .await
            .map_err(|err| CopyError::Remote(err.into()))?;
        Ok(RulePage {
            rules: out.rules.unwrap_or_default(),
            next_marker: out.next_marker,
        })
    }

    async fn create_rule(&self, spec: RuleSpec) -> Result<Rule, CopyError> {
        debug!(
            "Creating rule with priority {} on: {}",
            spec.priority, spec.listener_arn
        );
        let out = self
            .client
            .create_rule()
            .listener_arn(&spec.listener_arn)
            .priority(spec.priority)
            .set_conditions(Some(spec.conditions))
            .set_actions(Some(spec.actions))
            .send()
            .await
            .map_err(|err| CopyError::Remote(err.into()))?;
        out.rules
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| CopyError::NotFound {
                resource: format!("created rule on {}", spec.listener_arn),
            })
    }
}

fn none_if_empty<T>(values: Vec<T>) -> Option<Vec<T>> {
    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}
