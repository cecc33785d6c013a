use aws_sdk_elasticloadbalancingv2::types::{ActionTypeEnum, Listener};
use log::debug;

use crate::arn;
use crate::cloner::target_group::{ensure_target_group, TargetGroupCache};
use crate::elb::{ElbApi, ListenerSpec};
use crate::types::CopyError;

/// Creates a copy of the source listener on the destination load balancer.
///
/// A forward default action gets its target group copied through the shared
/// cache and its reference rewritten; fixed-response and redirect default
/// actions are copied verbatim; any other type aborts the run.
pub async fn clone_listener(
    api: &dyn ElbApi,
    cache: &mut TargetGroupCache,
    source_listener_arn: &str,
    dest_lb_arn: &str,
    dest_tg_prefix: &str,
) -> Result<Listener, CopyError> {
    let source = api.describe_listener(source_listener_arn).await?;
    debug!(
        "Cloning listener {} onto {}",
        source_listener_arn, dest_lb_arn
    );

    let mut actions = source.default_actions.unwrap_or_default();
    let Some(first) = actions.first_mut() else {
        return Err(CopyError::Malformed {
            msg: format!("listener {} has no default action", source_listener_arn),
        });
    };
    match first.r#type.clone() {
        Some(ActionTypeEnum::Forward) => {
            let source_tg_arn =
                first
                    .target_group_arn
                    .as_deref()
                    .ok_or_else(|| CopyError::Malformed {
                        msg: format!(
                            "forward default action on {} has no target group ARN",
                            source_listener_arn
                        ),
                    })?;
            let tg_name = arn::target_group_name(source_tg_arn)?.to_string();
            let tg = ensure_target_group(api, cache, &tg_name, dest_tg_prefix).await?;
            first.target_group_arn = tg.target_group_arn;
            // Weighted multi-group forwarding is flattened to the first
            // target group.
            first.forward_config = None;
        }
        Some(ActionTypeEnum::FixedResponse) | Some(ActionTypeEnum::Redirect) => {}
        other => {
            return Err(CopyError::UnsupportedAction {
                action_type: other.map(|t| t.as_str().to_string()).unwrap_or_default(),
            });
        }
    }

    let spec = ListenerSpec {
        load_balancer_arn: dest_lb_arn.to_string(),
        protocol: source.protocol,
        port: source.port,
        ssl_policy: source.ssl_policy,
        certificates: source.certificates.unwrap_or_default(),
        alpn_policy: source.alpn_policy.unwrap_or_default(),
        default_actions: actions,
    };
    api.create_listener(spec).await
}
