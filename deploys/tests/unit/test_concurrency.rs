//! Concurrent API and agent access

use std::thread;

use deploys_protocol::{CommandResult, Status};

use crate::common::*;

#[test]
fn test_concurrent_deploys_and_results() {
    let cp = control_plane();
    let names: Vec<String> = (0..8).map(|i| format!("web-{}", i)).collect();

    thread::scope(|scope| {
        for name in &names {
            let cp = cp.clone();
            scope.spawn(move || {
                for i in 0..5 {
                    let image = format!("nginx:1.{}", i);
                    cp.deployment_deploy(ACTOR, web_deploy(name, &image)).unwrap();
                }
            });
        }

        let agent = cp.clone();
        scope.spawn(move || {
            for _ in 0..50 {
                let results = commands(&agent, LOCATION)
                    .iter()
                    .map(CommandResult::success)
                    .collect();
                report(&agent, LOCATION, results);
                thread::yield_now();
            }
        });
    });

    // Drain whatever the agent thread did not see
    ack_all(&cp);
    assert!(commands(&cp, LOCATION).is_empty());

    for name in &names {
        let revisions = cp.deployment_revisions(target(name)).unwrap();
        let numbers: Vec<u64> = revisions.items.iter().map(|r| r.revision).collect();
        assert_eq!(numbers, vec![5, 4, 3, 2, 1], "{name}");
        assert_eq!(revisions.items[0].status, Status::Success, "{name}");
        assert_eq!(revisions.items[0].image, "nginx:1.4", "{name}");
    }
}

#[test]
fn test_concurrent_create_single_winner() {
    let cp = control_plane();
    let outcomes: Vec<bool> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cp = cp.clone();
                scope.spawn(move || {
                    cp.disk_create(
                        ACTOR,
                        deploys::models::disk::DiskCreate {
                            project: PROJECT.to_string(),
                            location: LOCATION.to_string(),
                            name: "data".to_string(),
                            size: 5,
                        },
                    )
                    .is_ok()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(outcomes.iter().filter(|ok| **ok).count(), 1);
    assert_eq!(cp.store.len(), 1);
}
