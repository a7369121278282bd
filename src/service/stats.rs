use chrono::{DateTime, Duration, Utc};
use sea_orm::{DatabaseConnection, EntityTrait};
use std::collections::HashMap;

use crate::entity::alarm::{self, AlarmStatus, Entity as AlarmEntity, Severity};
use crate::entity::region::{self, Entity as RegionEntity};
use crate::entity::site::{self, Entity as SiteEntity, SiteStatus};
use crate::entity::team::{self, Entity as TeamEntity};
use crate::entity::ticket::{self, Entity as TicketEntity, TicketStatus};
use crate::model::global_error::AppError;
use crate::model::stats::{
    AlarmCounts, DashboardStats, GroupCount, ImpactedSite, RegionRollup, SiteCounts,
    TeamTicketCount, TicketStats,
};

/// Everything is recomputed from current rows on each call; the aggregator
/// owns no state.
pub async fn dashboard_stats(db: &DatabaseConnection) -> Result<DashboardStats, AppError> {
    let sites = SiteEntity::find()
        .find_also_related(RegionEntity)
        .all(db)
        .await?;
    let alarms = AlarmEntity::find().all(db).await?;

    Ok(summarize_dashboard(&sites, &alarms))
}

pub async fn ticket_stats(db: &DatabaseConnection) -> Result<TicketStats, AppError> {
    let tickets = TicketEntity::find().all(db).await?;
    let teams = TeamEntity::find().all(db).await?;

    Ok(summarize_tickets(&tickets, &teams, Utc::now()))
}

pub fn summarize_dashboard(
    sites: &[(site::Model, Option<region::Model>)],
    alarms: &[alarm::Model],
) -> DashboardStats {
    let mut site_counts = SiteCounts { total: 0, active: 0, inactive: 0, maintenance: 0 };
    for (site, _) in sites {
        site_counts.total += 1;
        match site.status {
            SiteStatus::Active => site_counts.active += 1,
            SiteStatus::Inactive => site_counts.inactive += 1,
            SiteStatus::Maintenance => site_counts.maintenance += 1,
        }
    }

    let active: Vec<&alarm::Model> = alarms
        .iter()
        .filter(|a| a.status == AlarmStatus::Active)
        .collect();

    let alarm_counts = AlarmCounts {
        total: alarms.len() as u64,
        active: active.len() as u64,
        critical: active.iter().filter(|a| a.severity == Severity::Critical).count() as u64,
    };

    let alarms_by_type =
        group_counts(active.iter().map(|a| format!("{:?}", a.alarm_type).to_lowercase()));
    let alarms_by_severity =
        group_counts(active.iter().map(|a| format!("{:?}", a.severity).to_lowercase()));

    // Active alarms attributed to regions through their site.
    let mut active_per_site: HashMap<i32, u64> = HashMap::new();
    for a in &active {
        *active_per_site.entry(a.site_id).or_default() += 1;
    }

    let mut rollups: Vec<RegionRollup> = Vec::new();
    for (site, region) in sites {
        let name = region
            .as_ref()
            .map(|r| r.name.clone())
            .unwrap_or_default();
        let idx = match rollups.iter().position(|r| r.region == name) {
            Some(idx) => idx,
            None => {
                rollups.push(RegionRollup {
                    region: name,
                    total: 0,
                    active: 0,
                    inactive: 0,
                    maintenance: 0,
                    active_alarms: 0,
                });
                rollups.len() - 1
            }
        };
        let rollup = &mut rollups[idx];

        rollup.total += 1;
        match site.status {
            SiteStatus::Active => rollup.active += 1,
            SiteStatus::Inactive => rollup.inactive += 1,
            SiteStatus::Maintenance => rollup.maintenance += 1,
        }
        rollup.active_alarms += active_per_site.get(&site.id).copied().unwrap_or(0);
    }
    rollups.sort_by(|a, b| a.region.cmp(&b.region));

    let top_impacted_sites = top_impacted(sites, &active_per_site);

    DashboardStats {
        sites: site_counts,
        alarms: alarm_counts,
        alarms_by_type,
        alarms_by_severity,
        sites_by_region: rollups,
        top_impacted_sites,
    }
}

/// Sites ranked by active alarm count, descending, stable on ties,
/// zero-count sites excluded, capped at ten.
fn top_impacted(
    sites: &[(site::Model, Option<region::Model>)],
    active_per_site: &HashMap<i32, u64>,
) -> Vec<ImpactedSite> {
    let mut impacted: Vec<ImpactedSite> = sites
        .iter()
        .filter_map(|(site, region)| {
            let count = active_per_site.get(&site.id).copied().unwrap_or(0);
            (count > 0).then(|| ImpactedSite {
                site: site.name.clone(),
                region: region.as_ref().map(|r| r.name.clone()).unwrap_or_default(),
                alarm_count: count,
            })
        })
        .collect();

    impacted.sort_by(|a, b| b.alarm_count.cmp(&a.alarm_count));
    impacted.truncate(10);
    impacted
}

/// Counts labels, ordered by count descending. `sort_by` is stable, so ties
/// keep first-encounter order.
fn group_counts(labels: impl Iterator<Item = String>) -> Vec<GroupCount> {
    let mut groups: Vec<GroupCount> = Vec::new();
    for label in labels {
        match groups.iter().position(|g| g.label == label) {
            Some(idx) => groups[idx].count += 1,
            None => groups.push(GroupCount { label, count: 1 }),
        }
    }

    groups.sort_by(|a, b| b.count.cmp(&a.count));
    groups
}

pub fn summarize_tickets(
    tickets: &[ticket::Model],
    teams: &[team::Model],
    now: DateTime<Utc>,
) -> TicketStats {
    let mut stats = TicketStats {
        total: tickets.len() as u64,
        open: 0,
        in_progress: 0,
        resolved: 0,
        closed: 0,
        by_priority: Vec::new(),
        by_team: Vec::new(),
        recent_count: 0,
    };

    let cutoff = now - Duration::days(30);
    let team_names: HashMap<i32, &str> =
        teams.iter().map(|t| (t.id, t.name.as_str())).collect();

    for t in tickets {
        match t.status {
            TicketStatus::Open => stats.open += 1,
            TicketStatus::InProgress => stats.in_progress += 1,
            TicketStatus::Resolved => stats.resolved += 1,
            TicketStatus::Closed => stats.closed += 1,
        }

        if DateTime::<Utc>::from(t.created_at) >= cutoff {
            stats.recent_count += 1;
        }

        let team = team_names.get(&t.team_id).copied().unwrap_or_default();
        let idx = match stats.by_team.iter().position(|e| e.team == team) {
            Some(idx) => idx,
            None => {
                stats.by_team.push(TeamTicketCount {
                    team: team.to_string(),
                    count: 0,
                    open: 0,
                    in_progress: 0,
                    resolved: 0,
                });
                stats.by_team.len() - 1
            }
        };
        let entry = &mut stats.by_team[idx];
        entry.count += 1;
        match t.status {
            TicketStatus::Open => entry.open += 1,
            TicketStatus::InProgress => entry.in_progress += 1,
            TicketStatus::Resolved => entry.resolved += 1,
            TicketStatus::Closed => {}
        }
    }

    stats.by_priority =
        group_counts(tickets.iter().map(|t| format!("{:?}", t.priority).to_lowercase()));
    stats.by_team.sort_by(|a, b| b.count.cmp(&a.count));

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::alarm::AlarmType;
    use crate::entity::ticket::Priority;

    fn make_region(id: i32, name: &str) -> region::Model {
        region::Model {
            id,
            name: name.into(),
            code: format!("R{id}"),
            description: None,
            created_at: Utc::now().into(),
        }
    }

    fn make_site(id: i32, name: &str, status: SiteStatus) -> site::Model {
        site::Model {
            id,
            name: name.into(),
            code: format!("S{id}"),
            region_id: 1,
            latitude: 0.0,
            longitude: 0.0,
            status,
            ip_address: "10.0.0.1".into(),
            last_ping: None,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    fn make_alarm(id: i32, site_id: i32, status: AlarmStatus, severity: Severity) -> alarm::Model {
        alarm::Model {
            id,
            site_id,
            alarm_type: AlarmType::Power,
            severity,
            status,
            title: "alarm".into(),
            description: String::new(),
            acknowledged_by: None,
            acknowledged_at: None,
            resolved_by: None,
            resolved_at: None,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    fn make_ticket(id: i32, team_id: i32, status: TicketStatus, created: DateTime<Utc>) -> ticket::Model {
        ticket::Model {
            id,
            alarm_id: id,
            team_id,
            assigned_to: None,
            status,
            priority: Priority::Medium,
            title: "t".into(),
            description: String::new(),
            resolution: String::new(),
            resolved_at: None,
            closed_at: None,
            created_at: created.into(),
            updated_at: created.into(),
        }
    }

    #[test]
    fn top_impacted_excludes_zero_and_keeps_stable_tie_order() {
        let region = make_region(1, "North");
        let sites: Vec<(site::Model, Option<region::Model>)> = (1..=5)
            .map(|i| (make_site(i, &format!("site-{i}"), SiteStatus::Active), Some(region.clone())))
            .collect();

        // Active alarm counts per site: [5, 0, 3, 3, 1].
        let mut alarms = Vec::new();
        let mut next_id = 1;
        for (site_id, n) in [(1, 5), (2, 0), (3, 3), (4, 3), (5, 1)] {
            for _ in 0..n {
                alarms.push(make_alarm(next_id, site_id, AlarmStatus::Active, Severity::Minor));
                next_id += 1;
            }
        }

        let stats = summarize_dashboard(&sites, &alarms);
        let top = &stats.top_impacted_sites;

        assert_eq!(top.len(), 4);
        assert_eq!(
            top.iter().map(|s| s.alarm_count).collect::<Vec<_>>(),
            vec![5, 3, 3, 1]
        );
        // Tied sites keep their encounter order.
        assert_eq!(top[1].site, "site-3");
        assert_eq!(top[2].site, "site-4");
        assert!(top.iter().all(|s| s.site != "site-2"));
    }

    #[test]
    fn only_active_alarms_are_counted() {
        let region = make_region(1, "North");
        let sites = vec![(make_site(1, "s1", SiteStatus::Active), Some(region))];
        let alarms = vec![
            make_alarm(1, 1, AlarmStatus::Active, Severity::Critical),
            make_alarm(2, 1, AlarmStatus::Acknowledged, Severity::Critical),
            make_alarm(3, 1, AlarmStatus::Resolved, Severity::Major),
        ];

        let stats = summarize_dashboard(&sites, &alarms);
        assert_eq!(stats.alarms.total, 3);
        assert_eq!(stats.alarms.active, 1);
        assert_eq!(stats.alarms.critical, 1);
        assert_eq!(stats.sites_by_region[0].active_alarms, 1);
    }

    #[test]
    fn severity_groups_order_by_count_descending() {
        let region = make_region(1, "North");
        let sites = vec![(make_site(1, "s1", SiteStatus::Active), Some(region))];
        let alarms = vec![
            make_alarm(1, 1, AlarmStatus::Active, Severity::Warning),
            make_alarm(2, 1, AlarmStatus::Active, Severity::Critical),
            make_alarm(3, 1, AlarmStatus::Active, Severity::Critical),
        ];

        let stats = summarize_dashboard(&sites, &alarms);
        assert_eq!(
            stats.alarms_by_severity,
            vec![
                GroupCount { label: "critical".into(), count: 2 },
                GroupCount { label: "warning".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn ticket_stats_count_statuses_and_trailing_window() {
        let now = Utc::now();
        let team = team::Model {
            id: 1,
            name: "Power".into(),
            team_type: crate::entity::team::TeamType::Power,
            description: None,
            is_active: true,
            created_at: now.into(),
        };

        let tickets = vec![
            make_ticket(1, 1, TicketStatus::Open, now),
            make_ticket(2, 1, TicketStatus::InProgress, now - Duration::days(10)),
            make_ticket(3, 1, TicketStatus::Closed, now - Duration::days(45)),
        ];

        let stats = summarize_tickets(&tickets, &[team], now);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.open, 1);
        assert_eq!(stats.in_progress, 1);
        assert_eq!(stats.closed, 1);
        assert_eq!(stats.recent_count, 2);
        assert_eq!(stats.by_team.len(), 1);
        assert_eq!(stats.by_team[0].team, "Power");
        assert_eq!(stats.by_team[0].count, 3);
        // Closed tickets have no slot in the per-team breakdown.
        assert_eq!(stats.by_team[0].open, 1);
    }
}
