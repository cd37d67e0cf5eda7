//! Scorecards built from a user's bookmarks against a body's roster.

mod common;

use chrono::{Duration, Utc};
use common::factories::{current_session, member, LegislationFactory};
use common::harness::Harness;
use legtrack::resolver::{Capability, ResolveError};
use legtrack::scorecard::ScorecardError;
use legtrack::source::Vote;
use legtrack::store::LegislationStore;
use lt_core::{known, Bookmark, BodyId, Legislation, MemberKey, WhipCount};
use uuid::Uuid;

async fn bookmark(h: &Harness, user_id: Uuid, bill: &Legislation, oppose: bool) {
    h.memory
        .save_bookmark(&Bookmark {
            user_id,
            body: bill.body.clone(),
            legislation_id: bill.id.clone(),
            oppose,
            notes: String::new(),
            created: Utc::now(),
        })
        .await
        .unwrap();
}

fn slug(s: &str) -> MemberKey {
    MemberKey::Slug(s.into())
}

#[tokio::test]
async fn test_scorecard_uses_current_session_roster() {
    let h = Harness::new(5);
    let session = current_session(known::NY_SENATE);
    h.source(known::NY_SENATE)
        .set_members(session, vec![member("alice"), member("bob")]);

    let card = h
        .scorecards()
        .for_user(Uuid::new_v4(), &BodyId::new(known::NY_SENATE))
        .await
        .unwrap();

    assert_eq!(card.session, session);
    assert_eq!(h.source(known::NY_SENATE).members_calls(), vec![session]);
    assert_eq!(card.people.len(), 2);
    assert!(card.items.is_empty());
    assert_eq!(card.person(&slug("bob")).unwrap().whip_count, WhipCount::default());
}

#[tokio::test]
async fn test_votes_outrank_sponsorship() {
    let h = Harness::new(5);
    let user = Uuid::new_v4();
    let session = current_session(known::NY_SENATE);
    h.source(known::NY_SENATE).set_members(
        session,
        vec![member("alice"), member("bob"), member("carol")],
    );

    let bill = LegislationFactory::ny_senate(100)
        .with_sponsors(vec![member("alice"), member("bob")])
        .build();
    h.track(&bill).await;
    h.source(known::NY_SENATE).set_legislation(bill.clone());
    h.source(known::NY_SENATE).set_votes(
        bill.id.clone(),
        vec![Vote {
            member: member("bob"),
            status: "Nay".into(),
        }],
    );
    bookmark(&h, user, &bill, false).await;

    let card = h
        .scorecards()
        .for_user(user, &bill.body)
        .await
        .unwrap();

    let status = |who: &str| card.person(&slug(who)).unwrap().scores[0].status.clone();
    assert_eq!(status("alice"), "Sponsor");
    assert_eq!(status("bob"), "Nay");
    assert_eq!(status("carol"), "");

    assert_eq!(
        card.items[0].whip_count,
        WhipCount {
            total: 3,
            correct: 1,
            incorrect: 1,
        }
    );
}

#[tokio::test]
async fn test_whip_counts_follow_desired_outcome() {
    let h = Harness::new(5);
    let user = Uuid::new_v4();
    let session = current_session(known::NY_SENATE);
    h.source(known::NY_SENATE)
        .set_members(session, vec![member("alice"), member("bob")]);

    let support = LegislationFactory::ny_senate(201).build();
    let oppose = LegislationFactory::ny_senate(202).build();
    for bill in [&support, &oppose] {
        h.track(bill).await;
        h.source(known::NY_SENATE).set_legislation(bill.clone());
        h.source(known::NY_SENATE).set_votes(
            bill.id.clone(),
            vec![
                Vote {
                    member: member("alice"),
                    status: "Aye".into(),
                },
                Vote {
                    member: member("bob"),
                    status: "Nay".into(),
                },
            ],
        );
    }
    bookmark(&h, user, &support, false).await;
    bookmark(&h, user, &oppose, true).await;

    let card = h
        .scorecards()
        .for_user(user, &support.body)
        .await
        .unwrap();

    assert_eq!(card.items.len(), 2);
    assert!(card.items.iter().any(|c| c.oppose));

    // Aye on a wanted bill and aye on an unwanted one cancel out
    let alice = card.person(&slug("alice")).unwrap();
    assert_eq!(alice.whip_count.total, 2);
    assert_eq!(alice.whip_count.correct, 1);
    assert_eq!(alice.whip_count.incorrect, 1);
    assert!(alice.whip_count.percent().abs() < f64::EPSILON);
    assert!((alice.whip_count.percent_correct() - 50.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_bookmarks_on_untracked_bills_are_dropped() {
    let h = Harness::new(5);
    let user = Uuid::new_v4();
    let tracked = LegislationFactory::ny_senate(301).build();
    let untracked = LegislationFactory::ny_senate(302).build();
    h.track(&tracked).await;
    h.source(known::NY_SENATE).set_legislation(tracked.clone());
    bookmark(&h, user, &tracked, false).await;
    bookmark(&h, user, &untracked, false).await;

    let scored = h
        .scorecards()
        .bookmarks_for(user, &tracked.body)
        .await
        .unwrap();
    assert_eq!(scored.len(), 1);
    assert_eq!(scored[0].legislation.id, tracked.id);

    let card = h
        .scorecards()
        .for_user(user, &tracked.body)
        .await
        .unwrap();
    assert_eq!(card.items.len(), 1);
}

#[tokio::test]
async fn test_bookmarks_are_scoped_to_user_and_body() {
    let h = Harness::new(5);
    let user = Uuid::new_v4();
    let senate = LegislationFactory::ny_senate(401).build();
    let council = LegislationFactory::council(401).build();
    h.track(&senate).await;
    h.track(&council).await;
    bookmark(&h, user, &senate, false).await;
    bookmark(&h, user, &council, true).await;
    bookmark(&h, Uuid::new_v4(), &senate, true).await;

    let scored = h
        .scorecards()
        .bookmarks_for(user, &senate.body)
        .await
        .unwrap();

    assert_eq!(scored.len(), 1);
    assert!(!scored[0].bookmark.oppose);
}

#[tokio::test]
async fn test_rebookmarking_replaces_the_position() {
    let h = Harness::new(5);
    let user = Uuid::new_v4();
    let bill = LegislationFactory::ny_senate(501).build();
    h.track(&bill).await;
    bookmark(&h, user, &bill, false).await;
    bookmark(&h, user, &bill, true).await;

    let scored = h
        .scorecards()
        .bookmarks_for(user, &bill.body)
        .await
        .unwrap();

    assert_eq!(scored.len(), 1);
    assert!(scored[0].bookmark.oppose);
}

#[tokio::test]
async fn test_body_without_scorecards_is_unsupported() {
    let h = Harness::new(5);

    let err = h
        .scorecards()
        .for_user(Uuid::new_v4(), &BodyId::new(known::US_HOUSE))
        .await
        .unwrap_err();

    match err {
        ScorecardError::Resolve(ResolveError::Unsupported { body, capability }) => {
            assert_eq!(body.as_str(), known::US_HOUSE);
            assert_eq!(capability, Capability::Scorecard);
        }
        other => panic!("expected unsupported, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unknown_body_is_rejected() {
    let h = Harness::new(5);

    let err = h
        .scorecards()
        .for_user(Uuid::new_v4(), &BodyId::new("atlantis-senate"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ScorecardError::Resolve(ResolveError::UnknownBody(_))
    ));
}

#[tokio::test]
async fn test_upstream_failure_fails_the_scorecard() {
    let h = Harness::new(5);
    let user = Uuid::new_v4();
    let bill = LegislationFactory::ny_senate(601)
        .checked_at(Utc::now() - Duration::hours(1))
        .build();
    h.track(&bill).await;
    h.source(known::NY_SENATE)
        .fail_legislation(bill.id.clone(), 503, "down");
    bookmark(&h, user, &bill, false).await;

    let err = h
        .scorecards()
        .for_user(user, &bill.body)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ScorecardError::Resolve(ResolveError::Remote { .. })
    ));
}
