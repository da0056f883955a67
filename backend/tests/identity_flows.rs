//! End-to-end coverage of the signup, login, and follow flows against the
//! in-memory credential store.

use std::sync::Arc;

use chrono::Duration;
use rstest::rstest;
use tracing_subscriber::{EnvFilter, fmt};

use backend::domain::{
    AuthService, CredentialHasher, ErrorCode, FollowOutcome, HashingCost, LoginCredentials,
    OperationDeadlines, RelationshipService, SessionTokenIssuer, SignupRequest, UserId,
};
use backend::outbound::persistence::InMemoryCredentialStore;

const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

struct Flows {
    auth: AuthService<InMemoryCredentialStore>,
    relationships: RelationshipService<InMemoryCredentialStore>,
}

fn flows() -> Flows {
    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();

    let store = Arc::new(InMemoryCredentialStore::new());
    let hasher = CredentialHasher::new(HashingCost {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    })
    .expect("minimum cost settings are valid");
    let tokens = Arc::new(
        SessionTokenIssuer::new(SECRET, Duration::hours(1)).expect("valid issuer settings"),
    );

    Flows {
        auth: AuthService::new(
            store.clone(),
            hasher,
            tokens,
            OperationDeadlines::default(),
        ),
        relationships: RelationshipService::new(store, OperationDeadlines::default()),
    }
}

fn signup(name: &str, email: &str, username: &str, password: &str) -> SignupRequest {
    SignupRequest::try_from_parts(name, email, username, password).expect("valid signup request")
}

fn login(username: &str, password: &str) -> LoginCredentials {
    LoginCredentials::try_from_parts(username, password).expect("valid login credentials")
}

#[rstest]
#[tokio::test]
async fn signup_login_follow_scenario() {
    let flows = flows();

    // Ann signs up once; the duplicate username is rejected.
    let ann = flows
        .auth
        .signup(signup("Ann", "ann@x.com", "ann", "pw1"))
        .await
        .expect("first signup succeeds");
    let duplicate = flows
        .auth
        .signup(signup("Other Ann", "other@x.com", "ann", "pw2"))
        .await
        .expect_err("duplicate username must fail");
    assert_eq!(duplicate.code(), ErrorCode::Conflict);

    // Wrong password fails; the right one logs in and yields a live session.
    let rejected = flows
        .auth
        .login(login("ann", "wrong"))
        .await
        .expect_err("wrong password must fail");
    assert_eq!(rejected.code(), ErrorCode::Unauthorized);
    assert_eq!(rejected.message(), "invalid credentials");

    let logged_in = flows
        .auth
        .login(login("ann", "pw1"))
        .await
        .expect("login succeeds");
    assert_eq!(logged_in.profile.id, ann.profile.id);
    let bound = flows
        .auth
        .validate_session(&logged_in.session.token)
        .expect("session validates");
    assert_eq!(bound, ann.profile.id);

    // A second user appears and Ann follows, then unfollows.
    let ben = flows
        .auth
        .signup(signup("Ben", "ben@x.com", "ben", "pw3"))
        .await
        .expect("second signup succeeds");

    let followed = flows
        .relationships
        .follow_unfollow(&ann.profile.id, &ben.profile.id)
        .await
        .expect("follow succeeds");
    assert_eq!(followed, FollowOutcome::Followed);

    let audit = flows
        .relationships
        .audit_symmetry()
        .await
        .expect("audit succeeds");
    assert!(audit.is_consistent());
    assert_eq!(audit.scanned, 2);

    let unfollowed = flows
        .relationships
        .follow_unfollow(&ann.profile.id, &ben.profile.id)
        .await
        .expect("unfollow succeeds");
    assert_eq!(unfollowed, FollowOutcome::Unfollowed);

    let audit = flows
        .relationships
        .audit_symmetry()
        .await
        .expect("audit succeeds");
    assert!(audit.is_consistent());

    // Logout is idempotent with or without a session in hand.
    flows
        .auth
        .logout(Some(logged_in.session.token))
        .expect("logout succeeds");
    flows.auth.logout(None).expect("logout succeeds again");
}

#[rstest]
#[tokio::test]
async fn duplicate_email_is_rejected_like_duplicate_username() {
    let flows = flows();
    flows
        .auth
        .signup(signup("Ann", "ann@x.com", "ann", "pw1"))
        .await
        .expect("first signup succeeds");

    let by_email = flows
        .auth
        .signup(signup("Impostor", "ann@x.com", "impostor", "pw2"))
        .await
        .expect_err("duplicate email must fail");
    let by_username = flows
        .auth
        .signup(signup("Impostor", "impostor@x.com", "ann", "pw2"))
        .await
        .expect_err("duplicate username must fail");

    assert_eq!(by_email.code(), ErrorCode::Conflict);
    assert_eq!(by_username.code(), ErrorCode::Conflict);
    assert_eq!(by_email.message(), by_username.message());
}

#[rstest]
#[tokio::test]
async fn unknown_user_login_matches_wrong_password_exactly() {
    let flows = flows();
    flows
        .auth
        .signup(signup("Ann", "ann@x.com", "ann", "pw1"))
        .await
        .expect("signup succeeds");

    let unknown = flows
        .auth
        .login(login("ghost", "pw1"))
        .await
        .expect_err("unknown user must fail");
    let mismatch = flows
        .auth
        .login(login("ann", "wrong"))
        .await
        .expect_err("wrong password must fail");

    assert_eq!(unknown.code(), mismatch.code());
    assert_eq!(unknown.message(), mismatch.message());
}

#[rstest]
#[tokio::test]
async fn self_follow_never_mutates_the_graph() {
    let flows = flows();
    let ann = flows
        .auth
        .signup(signup("Ann", "ann@x.com", "ann", "pw1"))
        .await
        .expect("signup succeeds");

    let error = flows
        .relationships
        .follow_unfollow(&ann.profile.id, &ann.profile.id)
        .await
        .expect_err("self follow must fail");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);

    let audit = flows
        .relationships
        .audit_symmetry()
        .await
        .expect("audit succeeds");
    assert!(audit.is_consistent());
    assert_eq!(audit.scanned, 1);
}

#[rstest]
#[tokio::test]
async fn follows_against_unknown_users_are_not_found() {
    let flows = flows();
    let ann = flows
        .auth
        .signup(signup("Ann", "ann@x.com", "ann", "pw1"))
        .await
        .expect("signup succeeds");

    let error = flows
        .relationships
        .follow_unfollow(&ann.profile.id, &UserId::random())
        .await
        .expect_err("unknown target must fail");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn concurrent_duplicate_follows_converge() {
    let flows = flows();
    let ann = flows
        .auth
        .signup(signup("Ann", "ann@x.com", "ann", "pw1"))
        .await
        .expect("signup succeeds");
    let ben = flows
        .auth
        .signup(signup("Ben", "ben@x.com", "ben", "pw2"))
        .await
        .expect("signup succeeds");

    let relationships = &flows.relationships;
    let (first, second) = tokio::join!(
        relationships.follow_unfollow(&ann.profile.id, &ben.profile.id),
        relationships.follow_unfollow(&ann.profile.id, &ben.profile.id),
    );
    first.expect("first concurrent toggle succeeds");
    second.expect("second concurrent toggle succeeds");

    // Whatever the interleaving, the graph must end in a symmetric state.
    let audit = flows
        .relationships
        .audit_symmetry()
        .await
        .expect("audit succeeds");
    assert!(audit.is_consistent());
}
