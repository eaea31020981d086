//! Bitbucket pull request source against a wiremock server

use pullme::pr::bitbucket::BitbucketSettings;
use pullme::pr::{BitbucketPullRequestSource, MergeTaskState, PullRequestSource, SourceError};
use serde_json::{json, Value};
use wiremock::matchers::{basic_auth, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REPO_PATH: &str = "/repositories/acme/app";

fn settings(server: &MockServer) -> BitbucketSettings {
    BitbucketSettings {
        api_base_url: server.uri(),
        workspace: "acme".to_string(),
        repository: "app".to_string(),
        username: "ada".to_string(),
        token: "app-password".to_string(),
        page_length: 50,
        requests_per_second: 100,
    }
}

fn wire_pr(id: u64, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "state": "OPEN",
        "created_on": "2024-03-28T09:00:00.000000+00:00",
        "author": { "display_name": "Ada Lovelace", "uuid": "{1}" },
        "links": { "html": { "href": format!("https://bitbucket.org/acme/app/pull-requests/{id}") } }
    })
}

async fn mount_json(server: &MockServer, route: String, body: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_lists_all_pages_and_enriches_each_pr() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{REPO_PATH}/pullrequests")))
        .and(query_param("state", "OPEN"))
        .and(query_param_is_missing("page"))
        .and(basic_auth("ada", "app-password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "values": [wire_pr(1, "Add login flow")],
            "next": format!("{}{REPO_PATH}/pullrequests?state=OPEN&pagelen=50&page=2", server.uri())
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{REPO_PATH}/pullrequests")))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "values": [wire_pr(2, "[WIP] Billing")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    mount_json(
        &server,
        format!("{REPO_PATH}/pullrequests/1/statuses"),
        json!({ "values": [
            { "key": "ci/build", "state": "INPROGRESS", "name": "build" },
            { "key": "ci/lint", "state": "SOMETHING_NEW" }
        ] }),
    )
    .await;
    mount_json(
        &server,
        format!("{REPO_PATH}/pullrequests/1"),
        json!({ "id": 1, "participants": [
            { "role": "REVIEWER", "approved": true, "user": { "display_name": "Grace" } },
            { "role": "PARTICIPANT", "approved": false, "user": { "display_name": "Linus" } }
        ] }),
    )
    .await;
    mount_json(&server, format!("{REPO_PATH}/pullrequests/2/statuses"), json!({ "values": [] })).await;
    mount_json(&server, format!("{REPO_PATH}/pullrequests/2"), json!({ "id": 2 })).await;

    let source = BitbucketPullRequestSource::new(settings(&server)).unwrap();
    let prs = source.find_open_pull_requests().await.unwrap();

    assert_eq!(source.repository_name(), "acme/app");
    assert_eq!(prs.len(), 2);
    assert_eq!(prs[0].id, 1);
    assert_eq!(prs[0].url, "https://bitbucket.org/acme/app/pull-requests/1");
    assert_eq!(prs[0].merge_tasks[0].state, MergeTaskState::InProgress);
    assert_eq!(prs[0].merge_tasks[1].state, MergeTaskState::Unknown);
    assert_eq!(prs[0].approval_count(), 1);
    assert_eq!(prs[0].participants.len(), 2);
    assert_eq!(prs[1].title, "[WIP] Billing");
    assert!(prs[1].participants.is_empty());
}

#[tokio::test]
async fn test_enrichment_failure_degrades_to_empty() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        format!("{REPO_PATH}/pullrequests"),
        json!({ "values": [wire_pr(3, "Refactor")] }),
    )
    .await;
    Mock::given(method("GET"))
        .and(path(format!("{REPO_PATH}/pullrequests/3/statuses")))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{REPO_PATH}/pullrequests/3")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "type": "error", "error": { "message": "Pull request not found" }
        })))
        .mount(&server)
        .await;

    let source = BitbucketPullRequestSource::new(settings(&server)).unwrap();
    let prs = source.find_open_pull_requests().await.unwrap();

    assert_eq!(prs.len(), 1);
    assert!(prs[0].merge_tasks.is_empty());
    assert!(prs[0].participants.is_empty());
}

#[tokio::test]
async fn test_listing_failure_surfaces_bitbucket_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{REPO_PATH}/pullrequests")))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "type": "error", "error": { "message": "Invalid app password" }
        })))
        .mount(&server)
        .await;

    let source = BitbucketPullRequestSource::new(settings(&server)).unwrap();
    match source.find_open_pull_requests().await {
        Err(SourceError::Api { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "Invalid app password");
        }
        other => panic!("expected API error, got {other:?}"),
    }
}
