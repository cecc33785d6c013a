use std::collections::HashMap;

use aws_sdk_elasticloadbalancingv2::types::TargetGroup;
use log::{debug, info};

use crate::elb::{ElbApi, TargetGroupSpec};
use crate::types::CopyError;

/// Run-scoped record of the target groups created so far, keyed by the
/// destination-prefixed name. Consulted before every create so the same
/// source group is copied at most once per run.
#[derive(Debug, Default)]
pub struct TargetGroupCache {
    created: HashMap<String, TargetGroup>,
}

impl TargetGroupCache {
    pub fn new() -> Self {
        TargetGroupCache::default()
    }

    fn get(&self, dest_name: &str) -> Option<&TargetGroup> {
        self.created.get(dest_name)
    }

    fn insert(&mut self, dest_name: String, tg: TargetGroup) {
        self.created.insert(dest_name, tg);
    }
}

/// Returns the destination copy of the `source_name` target group, creating
/// it on first use.
///
/// This is the sole dedup point: the listener's default action and every
/// forward rule resolve their target group through here with the shared
/// cache, so a group referenced many times is still fetched and created once.
pub async fn ensure_target_group(
    api: &dyn ElbApi,
    cache: &mut TargetGroupCache,
    source_name: &str,
    dest_prefix: &str,
) -> Result<TargetGroup, CopyError> {
    let dest_name = format!("{}-{}", dest_prefix, source_name);
    if let Some(tg) = cache.get(&dest_name) {
        debug!("Reusing already-copied target group: {}", dest_name);
        return Ok(tg.clone());
    }
    let source = api.describe_target_group(source_name).await?;
    let spec = TargetGroupSpec {
        name: dest_name.clone(),
        protocol: source.protocol,
        protocol_version: source.protocol_version,
        port: source.port,
        vpc_id: source.vpc_id,
        target_type: source.target_type,
        health_check_protocol: source.health_check_protocol,
        health_check_port: source.health_check_port,
        health_check_enabled: source.health_check_enabled,
        health_check_path: source.health_check_path,
        health_check_interval_seconds: source.health_check_interval_seconds,
        health_check_timeout_seconds: source.health_check_timeout_seconds,
        healthy_threshold_count: source.healthy_threshold_count,
        unhealthy_threshold_count: source.unhealthy_threshold_count,
        matcher: source.matcher,
    };
    let created = api.create_target_group(spec).await?;
    info!("Created target group: {}", dest_name);
    cache.insert(dest_name, created.clone());
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloner::testutil::source_target_group;
    use crate::elb::fake::FakeElb;

    #[tokio::test]
    async fn copies_a_target_group_once() {
        let fake = FakeElb::new();
        fake.add_target_group("web-tg", source_target_group("web-tg"));
        let mut cache = TargetGroupCache::new();

        let first = ensure_target_group(&fake, &mut cache, "web-tg", "copied-tg")
            .await
            .unwrap();
        let second = ensure_target_group(&fake, &mut cache, "web-tg", "copied-tg")
            .await
            .unwrap();

        assert_eq!(first.target_group_name.as_deref(), Some("copied-tg-web-tg"));
        assert_eq!(first.target_group_arn, second.target_group_arn);
        assert_eq!(fake.count_calls("describe_target_group"), 1);
        assert_eq!(fake.count_calls("create_target_group"), 1);
    }

    #[tokio::test]
    async fn copies_health_check_settings() {
        let fake = FakeElb::new();
        fake.add_target_group("web-tg", source_target_group("web-tg"));
        let mut cache = TargetGroupCache::new();

        let created = ensure_target_group(&fake, &mut cache, "web-tg", "copied-tg")
            .await
            .unwrap();

        assert_eq!(created.health_check_path.as_deref(), Some("/healthz"));
        assert_eq!(created.port, Some(80));
        // The copy carries no association with the source load balancer.
        assert_eq!(created.load_balancer_arns, None);
    }

    #[tokio::test]
    async fn missing_source_group_is_not_found() {
        let fake = FakeElb::new();
        let mut cache = TargetGroupCache::new();

        let err = ensure_target_group(&fake, &mut cache, "web-tg", "copied-tg")
            .await
            .unwrap_err();

        assert!(matches!(err, CopyError::NotFound { .. }));
        assert_eq!(fake.count_calls("create_target_group"), 0);
    }
}
