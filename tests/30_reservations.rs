mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn listing_is_ordered_by_date_time_then_creation() -> Result<()> {
    let server = common::ensure_server().await?;
    let master = common::master_token(server).await?;
    let (_, admin) = common::provision_admin(server, &master, &common::unique("sort")).await?;

    common::create_reservation(server, &admin, "late", "2030-05-02", "09:00").await?;
    common::create_reservation(server, &admin, "early", "2030-05-01", "22:15").await?;
    common::create_reservation(server, &admin, "mid", "2030-05-02", "08:00").await?;

    let rows = common::list_reservations(server, &admin).await?;
    let names: Vec<&str> = rows.iter().map(|r| r["name"].as_str().unwrap()).collect();
    assert_eq!(names, ["early", "mid", "late"]);

    for pair in rows.windows(2) {
        let key = |r: &Value| {
            (
                r["date"].as_str().unwrap().to_string(),
                r["time"].as_str().unwrap().to_string(),
                r["createdAt"].as_str().unwrap().to_string(),
            )
        };
        assert!(key(&pair[0]) <= key(&pair[1]));
    }
    Ok(())
}

#[tokio::test]
async fn creation_requires_all_trip_fields() -> Result<()> {
    let server = common::ensure_server().await?;
    let master = common::master_token(server).await?;
    let (_, admin) = common::provision_admin(server, &master, &common::unique("val")).await?;

    let before = common::list_reservations(server, &admin).await?.len();

    let res = common::post_json(
        server,
        Some(&admin),
        "/reservations",
        json!({ "name": "Kim", "from": "A", "to": "B", "date": "2030-05-01" }),
    )
    .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: Value = res.json().await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"]["phone"].is_string());
    assert!(body["field_errors"]["time"].is_string());

    // nothing was written
    let after = common::list_reservations(server, &admin).await?.len();
    assert_eq!(before, after);
    Ok(())
}

#[tokio::test]
async fn notes_default_to_empty() -> Result<()> {
    let server = common::ensure_server().await?;
    let master = common::master_token(server).await?;
    let (admin_id, admin) = common::provision_admin(server, &master, &common::unique("nt")).await?;

    let created =
        common::create_reservation(server, &admin, "no-notes", "2030-06-01", "10:00").await?;
    assert_eq!(created["notes"], "");
    assert_eq!(created["createdBy"], admin_id);
    assert!(created["id"].as_str().unwrap().contains("--"));
    Ok(())
}

#[tokio::test]
async fn users_see_their_subtree_but_cannot_write() -> Result<()> {
    let server = common::ensure_server().await?;
    let master = common::master_token(server).await?;
    let (_, admin) = common::provision_admin(server, &master, &common::unique("adm")).await?;
    let (_, user) = common::provision_user(server, &admin, &common::unique("usr")).await?;

    let created =
        common::create_reservation(server, &admin, "shared-trip", "2030-06-02", "10:00").await?;

    // the parent admin's reservation is visible to the user
    let rows = common::list_reservations(server, &user).await?;
    assert!(rows.iter().any(|r| r["id"] == created["id"]));

    // ...but the user may not create
    let res = common::post_json(
        server,
        Some(&user),
        "/reservations",
        json!({
            "name": "Sneaky", "phone": "010-0000-0000",
            "from": "A", "to": "B", "date": "2030-06-03", "time": "11:00",
        }),
    )
    .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // ...and the store shows no new row
    let rows = common::list_reservations(server, &user).await?;
    assert!(!rows.iter().any(|r| r["name"] == "Sneaky"));

    // nor edit or delete
    let id = created["id"].as_str().unwrap();
    let res = common::put_json(
        server,
        Some(&user),
        &format!("/reservations/{}", id),
        json!({ "notes": "mine now" }),
    )
    .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = common::delete(server, Some(&user), &format!("/reservations/{}", id)).await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn foreign_admins_cannot_see_or_touch_each_other() -> Result<()> {
    let server = common::ensure_server().await?;
    let master = common::master_token(server).await?;
    let (_, a1) = common::provision_admin(server, &master, &common::unique("a1")).await?;
    let (_, a2) = common::provision_admin(server, &master, &common::unique("a2")).await?;

    let created = common::create_reservation(server, &a1, "a1-trip", "2030-06-04", "09:30").await?;
    let id = created["id"].as_str().unwrap();

    // invisible to the unrelated admin
    let rows = common::list_reservations(server, &a2).await?;
    assert!(!rows.iter().any(|r| r["id"] == created["id"]));

    // present but out of scope: 403, not 404
    let res = common::put_json(
        server,
        Some(&a2),
        &format!("/reservations/{}", id),
        json!({ "notes": "intrusion" }),
    )
    .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = common::delete(server, Some(&a2), &format!("/reservations/{}", id)).await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = common::get(server, Some(&a2), &format!("/reservations/{}", id)).await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // visible to master
    let rows = common::list_reservations(server, &master).await?;
    assert!(rows.iter().any(|r| r["id"] == created["id"]));
    Ok(())
}

#[tokio::test]
async fn master_reads_everything_but_stays_read_only() -> Result<()> {
    let server = common::ensure_server().await?;
    let master = common::master_token(server).await?;
    let (_, admin) = common::provision_admin(server, &master, &common::unique("ro")).await?;

    let created = common::create_reservation(server, &admin, "ro-trip", "2030-06-05", "12:00").await?;
    let id = created["id"].as_str().unwrap();

    let rows = common::list_reservations(server, &master).await?;
    assert!(rows.iter().any(|r| r["id"] == created["id"]));

    // default policy: master may not create, edit or delete
    let res = common::post_json(
        server,
        Some(&master),
        "/reservations",
        json!({
            "name": "By master", "phone": "010-0000-0000",
            "from": "A", "to": "B", "date": "2030-06-06", "time": "13:00",
        }),
    )
    .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = common::put_json(
        server,
        Some(&master),
        &format!("/reservations/{}", id),
        json!({ "notes": "from master" }),
    )
    .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn update_is_a_merge_patch() -> Result<()> {
    let server = common::ensure_server().await?;
    let master = common::master_token(server).await?;
    let (_, admin) = common::provision_admin(server, &master, &common::unique("mp")).await?;

    let created = common::create_reservation(server, &admin, "patch-me", "2030-06-07", "09:00").await?;
    let id = created["id"].as_str().unwrap();

    let res = common::put_json(
        server,
        Some(&admin),
        &format!("/reservations/{}", id),
        json!({ "time": "10:30", "notes": "wheelchair" }),
    )
    .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await?;
    let updated = &body["data"];
    assert_eq!(updated["time"], "10:30");
    assert_eq!(updated["notes"], "wheelchair");
    // unspecified fields retain their stored values
    assert_eq!(updated["name"], created["name"]);
    assert_eq!(updated["phone"], created["phone"]);
    assert_eq!(updated["date"], created["date"]);
    assert_eq!(updated["createdAt"], created["createdAt"]);
    assert_eq!(updated["createdBy"], created["createdBy"]);
    Ok(())
}

#[tokio::test]
async fn empty_patch_is_idempotent() -> Result<()> {
    let server = common::ensure_server().await?;
    let master = common::master_token(server).await?;
    let (_, admin) = common::provision_admin(server, &master, &common::unique("idem")).await?;

    let created = common::create_reservation(server, &admin, "as-is", "2030-06-08", "09:00").await?;
    let id = created["id"].as_str().unwrap();
    let path = format!("/reservations/{}", id);

    let res = common::put_json(server, Some(&admin), &path, json!({})).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let once: Value = res.json().await?;
    assert_eq!(once["data"], created);

    let res = common::put_json(server, Some(&admin), &path, json!({})).await?;
    let twice: Value = res.json().await?;
    assert_eq!(twice["data"], once["data"]);
    Ok(())
}

#[tokio::test]
async fn delete_distinguishes_gone_from_never_there() -> Result<()> {
    let server = common::ensure_server().await?;
    let master = common::master_token(server).await?;
    let (_, admin) = common::provision_admin(server, &master, &common::unique("del")).await?;

    let created = common::create_reservation(server, &admin, "to-delete", "2030-06-09", "09:00").await?;
    let id = created["id"].as_str().unwrap();
    let path = format!("/reservations/{}", id);

    let res = common::delete(server, Some(&admin), &path).await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    // a second delete is a 404, not a silent success
    let res = common::delete(server, Some(&admin), &path).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = common::get(server, Some(&admin), &path).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn deleting_an_account_takes_its_reservations_along() -> Result<()> {
    let server = common::ensure_server().await?;
    let master = common::master_token(server).await?;
    let (admin_id, admin) = common::provision_admin(server, &master, &common::unique("casc")).await?;

    let created = common::create_reservation(server, &admin, "orphan-to-be", "2030-06-10", "09:00").await?;

    let res = common::delete(server, Some(&master), &format!("/admins/{}", admin_id)).await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    // the reservation went with its owner
    let rows = common::list_reservations(server, &master).await?;
    assert!(!rows.iter().any(|r| r["id"] == created["id"]));
    Ok(())
}
