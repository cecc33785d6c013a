use aws_sdk_elasticloadbalancingv2::types::{ActionTypeEnum, Rule};
use log::{debug, info};

use crate::arn;
use crate::cloner::target_group::{ensure_target_group, TargetGroupCache};
use crate::elb::{ElbApi, RuleSpec};
use crate::types::CopyError;

/// Fetches every rule of the listener, page by page. The loop trusts the
/// continuation marker: a final page that happens to be exactly full but
/// carries no marker still ends the listing.
async fn fetch_all_rules(
    api: &dyn ElbApi,
    listener_arn: &str,
    page_size: i32,
) -> Result<Vec<Rule>, CopyError> {
    let mut rules = Vec::new();
    let mut marker: Option<String> = None;
    loop {
        let page = api
            .describe_rules(listener_arn, page_size, marker.take())
            .await?;
        let full_page = page.rules.len() == page_size as usize;
        rules.extend(page.rules);
        marker = page.next_marker;
        if !full_page || marker.is_none() {
            break;
        }
    }
    Ok(rules)
}

/// Recreates the source listener's non-default forward rules on the
/// destination listener, in source order.
///
/// Each rule's target group is resolved through the shared cache. Rules
/// whose first action is not a forward are skipped without any remote call;
/// they are absent from the returned sequence.
pub async fn replicate_rules(
    api: &dyn ElbApi,
    cache: &mut TargetGroupCache,
    source_listener_arn: &str,
    dest_listener_arn: &str,
    dest_tg_prefix: &str,
    page_size: i32,
) -> Result<Vec<Rule>, CopyError> {
    let source_rules = fetch_all_rules(api, source_listener_arn, page_size).await?;
    debug!("Found {} rules on source listener", source_rules.len());

    let mut created = Vec::new();
    for rule in source_rules {
        if rule.is_default.unwrap_or(false) {
            debug!("Skipping default rule: {:?}", rule.rule_arn);
            continue;
        }
        let mut actions = rule.actions.unwrap_or_default();
        let Some(first) = actions.first_mut() else {
            info!("Skipping rule without actions: {:?}", rule.rule_arn);
            continue;
        };
        if first.r#type != Some(ActionTypeEnum::Forward) {
            // Only forward rules are reproduced.
            info!(
                "Skipping rule with {} action: {:?}",
                first.r#type.as_ref().map(|t| t.as_str()).unwrap_or_default(),
                rule.rule_arn
            );
            continue;
        }

        let source_tg_arn =
            first
                .target_group_arn
                .as_deref()
                .ok_or_else(|| CopyError::Malformed {
                    msg: format!("forward rule {:?} has no target group ARN", rule.rule_arn),
                })?;
        let tg_name = arn::target_group_name(source_tg_arn)?.to_string();
        let tg = ensure_target_group(api, cache, &tg_name, dest_tg_prefix).await?;
        first.target_group_arn = tg.target_group_arn;
        first.forward_config = None;

        let mut conditions = rule.conditions.unwrap_or_default();
        if let Some(condition) = conditions.first_mut() {
            // The control plane regenerates these from the plain values.
            condition.host_header_config = None;
            condition.path_pattern_config = None;
        }

        let priority = rule
            .priority
            .as_deref()
            .ok_or_else(|| CopyError::Malformed {
                msg: format!("rule {:?} has no priority", rule.rule_arn),
            })?
            .parse::<i32>()
            .map_err(|_| CopyError::Malformed {
                msg: format!(
                    "non-numeric priority {:?} on rule {:?}",
                    rule.priority, rule.rule_arn
                ),
            })?;

        let new_rule = api
            .create_rule(RuleSpec {
                listener_arn: dest_listener_arn.to_string(),
                priority,
                conditions,
                actions,
            })
            .await?;
        info!("Created rule with priority {}", priority);
        created.push(new_rule);
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    use aws_sdk_elasticloadbalancingv2::types::{
        Action, ActionTypeEnum, PathPatternConditionConfig, RedirectActionConfig,
        RedirectActionStatusCodeEnum, RuleCondition,
    };

    use super::*;
    use crate::cloner::testutil::*;
    use crate::elb::fake::FakeElb;
    use crate::elb::RulePage;

    fn redirect_action() -> Action {
        Action::builder()
            .r#type(ActionTypeEnum::Redirect)
            .redirect_config(
                RedirectActionConfig::builder()
                    .status_code(RedirectActionStatusCodeEnum::Http301)
                    .host("example.com")
                    .build(),
            )
            .build()
    }

    #[tokio::test]
    async fn follows_markers_across_pages() {
        let fake = FakeElb::new();
        fake.push_rule_page(RulePage {
            rules: vec![
                path_rule(1, "/a/*", redirect_action()),
                path_rule(2, "/b/*", redirect_action()),
            ],
            next_marker: Some("m1".to_string()),
        });
        fake.push_rule_page(RulePage {
            rules: vec![path_rule(3, "/c/*", redirect_action())],
            next_marker: None,
        });
        let mut cache = TargetGroupCache::new();

        replicate_rules(
            &fake,
            &mut cache,
            SRC_LISTENER_ARN,
            DEST_LISTENER_ARN,
            "copied-tg",
            2,
        )
        .await
        .unwrap();

        let calls = fake.calls();
        assert_eq!(fake.count_calls("describe_rules"), 2);
        assert!(calls[0].ends_with("page_size=2 marker=None"));
        assert!(calls[1].ends_with("page_size=2 marker=Some(\"m1\")"));
    }

    #[tokio::test]
    async fn full_final_page_without_marker_terminates() {
        let fake = FakeElb::new();
        fake.push_rule_page(RulePage {
            rules: vec![
                path_rule(1, "/a/*", redirect_action()),
                path_rule(2, "/b/*", redirect_action()),
            ],
            next_marker: None,
        });
        let mut cache = TargetGroupCache::new();

        replicate_rules(
            &fake,
            &mut cache,
            SRC_LISTENER_ARN,
            DEST_LISTENER_ARN,
            "copied-tg",
            2,
        )
        .await
        .unwrap();

        assert_eq!(fake.count_calls("describe_rules"), 1);
    }

    #[tokio::test]
    async fn partial_page_ends_listing_even_with_marker() {
        let fake = FakeElb::new();
        fake.push_rule_page(RulePage {
            rules: vec![path_rule(1, "/a/*", redirect_action())],
            next_marker: Some("m1".to_string()),
        });
        let mut cache = TargetGroupCache::new();

        replicate_rules(
            &fake,
            &mut cache,
            SRC_LISTENER_ARN,
            DEST_LISTENER_ARN,
            "copied-tg",
            2,
        )
        .await
        .unwrap();

        assert_eq!(fake.count_calls("describe_rules"), 1);
    }

    #[tokio::test]
    async fn copies_a_forward_rule() {
        let fake = FakeElb::new();
        fake.add_target_group("web-tg", source_target_group("web-tg"));
        let mut rule = path_rule(7, "/api/*", forward_action(&tg_arn("web-tg")));
        // Derived condition config the control plane would reject on create.
        let conditions = vec![RuleCondition::builder()
            .field("path-pattern")
            .values("/api/*")
            .path_pattern_config(
                PathPatternConditionConfig::builder()
                    .values("/api/*")
                    .build(),
            )
            .build()];
        rule.conditions = Some(conditions);
        fake.push_rule_page(RulePage {
            rules: vec![rule],
            next_marker: None,
        });
        let mut cache = TargetGroupCache::new();

        let copied = replicate_rules(
            &fake,
            &mut cache,
            SRC_LISTENER_ARN,
            DEST_LISTENER_ARN,
            "copied-tg",
            10,
        )
        .await
        .unwrap();

        assert_eq!(copied.len(), 1);
        let actions = copied[0].actions.as_ref().unwrap();
        assert!(actions[0]
            .target_group_arn
            .as_deref()
            .unwrap()
            .contains("copied-tg-web-tg"));
        let conditions = copied[0].conditions.as_ref().unwrap();
        assert_eq!(conditions[0].path_pattern_config, None);
        assert_eq!(fake.count_calls("create_rule"), 1);
        assert!(fake
            .calls()
            .iter()
            .any(|c| c.ends_with("priority=7") && c.starts_with("create_rule")));
    }

    #[tokio::test]
    async fn skips_non_forward_rules_without_resolving_target_groups() {
        let fake = FakeElb::new();
        fake.push_rule_page(RulePage {
            rules: vec![path_rule(1, "/old/*", redirect_action())],
            next_marker: None,
        });
        let mut cache = TargetGroupCache::new();

        let copied = replicate_rules(
            &fake,
            &mut cache,
            SRC_LISTENER_ARN,
            DEST_LISTENER_ARN,
            "copied-tg",
            10,
        )
        .await
        .unwrap();

        assert!(copied.is_empty());
        assert_eq!(fake.count_calls("describe_target_group"), 0);
        assert_eq!(fake.count_calls("create_target_group"), 0);
        assert_eq!(fake.count_calls("create_rule"), 0);
    }

    #[tokio::test]
    async fn skips_the_default_rule() {
        let fake = FakeElb::new();
        fake.add_target_group("web-tg", source_target_group("web-tg"));
        fake.push_rule_page(RulePage {
            rules: vec![default_rule(forward_action(&tg_arn("web-tg")))],
            next_marker: None,
        });
        let mut cache = TargetGroupCache::new();

        let copied = replicate_rules(
            &fake,
            &mut cache,
            SRC_LISTENER_ARN,
            DEST_LISTENER_ARN,
            "copied-tg",
            10,
        )
        .await
        .unwrap();

        assert!(copied.is_empty());
        assert_eq!(fake.count_calls("create_rule"), 0);
    }
}
