//! End-to-end facade tests against the in-memory store.

use std::sync::Arc;

use idm_admin::{
    AccountWrite, Fault, IdentityManager, IdentityMetadata, ManagerResult, PropertyDataType,
    PropertyDescriptor, PropertyValue,
};
use idm_model::{claim_types, UserAccount};
use idm_store::{AccountConfig, MemoryStore};

fn full_manager(store: &Arc<MemoryStore>) -> IdentityManager {
    IdentityManager::builder(store.clone())
        .groups(store.clone())
        .build()
}

fn users_only_manager(store: &Arc<MemoryStore>) -> IdentityManager {
    IdentityManager::builder(store.clone()).build()
}

fn prop(prop_type: &str, value: &str) -> PropertyValue {
    PropertyValue::new(prop_type, Some(value.to_string()))
}

async fn create_alice(manager: &IdentityManager) -> anyhow::Result<String> {
    let created = manager
        .create_user(&[
            prop(claim_types::USERNAME, "alice"),
            prop(claim_types::PASSWORD, "Sw0rdfish!"),
        ])
        .await?;
    Ok(created.into_data().expect("create payload").subject)
}

fn assert_failed_with<T: std::fmt::Debug>(result: &ManagerResult<T>, message: &str) {
    assert!(!result.is_success(), "expected failure, got {result:?}");
    assert_eq!(result.errors(), [message]);
}

#[tokio::test]
async fn create_then_get_round_trips() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let manager = full_manager(&store);

    let subject = create_alice(&manager).await?;
    let detail = manager.get_user(&subject).await?.into_data().expect("detail");

    assert_eq!(detail.subject, subject);
    assert_eq!(detail.username, "alice");
    assert_eq!(detail.name, None);
    assert_eq!(store.stored_secret(detail.subject.parse()?).await.as_deref(), Some("Sw0rdfish!"));
    Ok(())
}

#[tokio::test]
async fn detail_properties_follow_update_set_order() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let manager = full_manager(&store);

    let subject = create_alice(&manager).await?;
    let detail = manager.get_user(&subject).await?.into_data().expect("detail");

    let keys: Vec<&str> = detail.properties.iter().map(|p| p.prop_type.as_str()).collect();
    let expected: Vec<&str> = manager
        .metadata()
        .user
        .update_properties
        .iter()
        .map(|p| p.prop_type())
        .collect();
    assert_eq!(keys, expected);

    // The password reads back empty even though a secret is stored.
    let password = detail
        .properties
        .iter()
        .find(|p| p.prop_type == claim_types::PASSWORD)
        .expect("password property");
    assert_eq!(password.value, None);
    Ok(())
}

#[tokio::test]
async fn create_rejects_update_only_properties() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let manager = full_manager(&store);

    // Phone is editable after creation but has no create-set
    // descriptor, so supplying it at create time is a schema mismatch.
    let fault = manager
        .create_user(&[
            prop(claim_types::USERNAME, "bob"),
            prop(claim_types::PASSWORD, "Sw0rdfish!"),
            prop(claim_types::PHONE, "555-0100"),
        ])
        .await
        .unwrap_err();

    assert!(matches!(fault, Fault::UnknownPropertyType(key) if key == claim_types::PHONE));
    assert_eq!(store.account_count().await, 0);
    Ok(())
}

#[tokio::test]
async fn custom_create_set_properties_are_staged() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let manager = IdentityManager::builder(store.clone())
        .metadata(Box::new(|config, groups_supported, fields| {
            let mut metadata = IdentityMetadata::standard(config, groups_supported, fields);
            metadata
                .user
                .create_properties
                .push(PropertyDescriptor::from_accessors(
                    claim_types::PHONE,
                    "Phone",
                    PropertyDataType::String,
                    false,
                    |a: &UserAccount| a.mobile_phone.clone(),
                    |_, v| Ok(AccountWrite::ConfirmedPhone(Some(v.to_string()))),
                ));
            metadata
        }))
        .build();

    let created = manager
        .create_user(&[
            prop(claim_types::USERNAME, "bob"),
            prop(claim_types::PASSWORD, "Sw0rdfish!"),
            prop(claim_types::PHONE, "555-0100"),
        ])
        .await?;
    let subject = created.into_data().expect("payload").subject;

    let detail = manager.get_user(&subject).await?.into_data().expect("detail");
    let phone = detail
        .properties
        .iter()
        .find(|p| p.prop_type == claim_types::PHONE)
        .expect("phone property");
    assert_eq!(phone.value.as_deref(), Some("555-0100"));
    Ok(())
}

#[tokio::test]
async fn create_missing_required_writes_nothing() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let manager = full_manager(&store);

    let result = manager
        .create_user(&[prop(claim_types::USERNAME, "carol")])
        .await?;

    assert!(!result.is_success());
    assert_eq!(result.errors(), ["Password is required"]);
    assert_eq!(store.account_count().await, 0);
    Ok(())
}

#[tokio::test]
async fn create_duplicate_username_reports_through_envelope() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let manager = full_manager(&store);
    create_alice(&manager).await?;

    let result = manager
        .create_user(&[
            prop(claim_types::USERNAME, "alice"),
            prop(claim_types::PASSWORD, "0therSecret!"),
        ])
        .await?;

    assert!(!result.is_success());
    assert!(result.errors()[0].contains("alice"));
    assert_eq!(store.account_count().await, 1);
    Ok(())
}

#[tokio::test]
async fn create_with_unknown_property_faults() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let manager = full_manager(&store);

    let fault = manager
        .create_user(&[
            prop(claim_types::USERNAME, "dave"),
            prop(claim_types::PASSWORD, "Sw0rdfish!"),
            prop("shoe_size", "43"),
        ])
        .await
        .unwrap_err();

    assert!(matches!(fault, Fault::UnknownPropertyType(key) if key == "shoe_size"));
    assert_eq!(store.account_count().await, 0);
    Ok(())
}

#[tokio::test]
async fn malformed_subjects_fail_in_the_envelope() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let manager = full_manager(&store);

    assert_failed_with(&manager.get_user("not-a-uuid").await?, "Invalid subject");
    assert_failed_with(&manager.delete_user("").await?, "Invalid subject");
    assert_failed_with(
        &manager
            .set_user_property("42", claim_types::PHONE, "555-0100")
            .await?,
        "Invalid subject",
    );
    assert_failed_with(
        &manager.add_user_claim("xyz", claim_types::ROLE, "admins").await?,
        "Invalid subject",
    );
    Ok(())
}

#[tokio::test]
async fn missing_user_is_a_payload_free_success() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let manager = full_manager(&store);

    let result = manager
        .get_user("018f4a5e-0000-7000-8000-000000000000")
        .await?;

    assert!(result.is_success());
    assert!(result.into_data().is_none());
    Ok(())
}

#[tokio::test]
async fn set_property_routes_through_dedicated_write_paths() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let manager = full_manager(&store);
    let subject = create_alice(&manager).await?;
    let id = subject.parse()?;

    assert!(manager
        .set_user_property(&subject, claim_types::PASSWORD, "N3wSecret!")
        .await?
        .is_success());
    assert_eq!(store.stored_secret(id).await.as_deref(), Some("N3wSecret!"));

    assert!(manager
        .set_user_property(&subject, claim_types::EMAIL, "alice@example.com")
        .await?
        .is_success());
    assert!(manager
        .set_user_property(&subject, "login_allowed", "false")
        .await?
        .is_success());

    let detail = manager.get_user(&subject).await?.into_data().expect("detail");
    let value = |key: &str| {
        detail
            .properties
            .iter()
            .find(|p| p.prop_type == key)
            .and_then(|p| p.value.clone())
    };
    assert_eq!(value(claim_types::EMAIL).as_deref(), Some("alice@example.com"));
    assert_eq!(value("login_allowed").as_deref(), Some("false"));
    Ok(())
}

#[tokio::test]
async fn bad_boolean_is_a_validation_error() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let manager = full_manager(&store);
    let subject = create_alice(&manager).await?;

    let result = manager
        .set_user_property(&subject, "login_allowed", "maybe")
        .await?;

    assert!(!result.is_success());
    assert!(result.errors()[0].contains("maybe"));
    Ok(())
}

#[tokio::test]
async fn malformed_subject_wins_over_unknown_property() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let manager = full_manager(&store);

    // The subject is checked before the descriptor lookup, so a bad
    // handle stays a per-call envelope error even when the key is
    // undeclared too.
    assert_failed_with(
        &manager
            .set_user_property("not-a-uuid", "shoe_size", "43")
            .await?,
        "Invalid subject",
    );
    assert_failed_with(
        &manager
            .set_role_property("not-a-uuid", "shoe_size", "43")
            .await?,
        "Invalid subject",
    );
    Ok(())
}

#[tokio::test]
async fn unknown_property_type_faults_on_set() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let manager = full_manager(&store);
    let subject = create_alice(&manager).await?;

    let fault = manager
        .set_user_property(&subject, "shoe_size", "43")
        .await
        .unwrap_err();

    assert!(matches!(fault, Fault::UnknownPropertyType(key) if key == "shoe_size"));
    Ok(())
}

#[tokio::test]
async fn display_name_writes_replace_the_claim() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let manager = full_manager(&store);
    let subject = create_alice(&manager).await?;

    assert!(manager
        .set_user_property(&subject, claim_types::NAME, "Alice A.")
        .await?
        .is_success());
    assert!(manager
        .set_user_property(&subject, claim_types::NAME, "Alice Adams")
        .await?
        .is_success());

    let detail = manager.get_user(&subject).await?.into_data().expect("detail");
    assert_eq!(detail.name.as_deref(), Some("Alice Adams"));
    let name_claims = detail
        .claims
        .iter()
        .filter(|c| c.claim_type == claim_types::NAME)
        .count();
    assert_eq!(name_claims, 1);

    // Blank clears.
    assert!(manager
        .set_user_property(&subject, claim_types::NAME, "  ")
        .await?
        .is_success());
    let detail = manager.get_user(&subject).await?.into_data().expect("detail");
    assert_eq!(detail.name, None);
    Ok(())
}

#[tokio::test]
async fn blank_phone_clears_the_stored_value() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let manager = full_manager(&store);
    let subject = create_alice(&manager).await?;

    assert!(manager
        .set_user_property(&subject, claim_types::PHONE, "555-0100")
        .await?
        .is_success());
    assert!(manager
        .set_user_property(&subject, claim_types::PHONE, " ")
        .await?
        .is_success());

    let detail = manager.get_user(&subject).await?.into_data().expect("detail");
    let phone = detail
        .properties
        .iter()
        .find(|p| p.prop_type == claim_types::PHONE)
        .expect("phone property");
    assert_eq!(phone.value, None);
    Ok(())
}

#[tokio::test]
async fn claims_are_removed_by_exact_pair() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let manager = full_manager(&store);
    let subject = create_alice(&manager).await?;

    manager
        .add_user_claim(&subject, claim_types::ROLE, "admins")
        .await?;
    manager
        .add_user_claim(&subject, claim_types::ROLE, "users")
        .await?;
    manager
        .remove_user_claim(&subject, claim_types::ROLE, "admins")
        .await?;

    let detail = manager.get_user(&subject).await?.into_data().expect("detail");
    let roles: Vec<&str> = detail
        .claims
        .iter()
        .filter(|c| c.claim_type == claim_types::ROLE)
        .map(|c| c.value.as_str())
        .collect();
    assert_eq!(roles, ["users"]);
    Ok(())
}

#[tokio::test]
async fn delete_user_then_get_yields_no_payload() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let manager = full_manager(&store);
    let subject = create_alice(&manager).await?;

    assert!(manager.delete_user(&subject).await?.is_success());
    let repeat = manager.delete_user(&subject).await?;
    assert!(!repeat.is_success());

    let result = manager.get_user(&subject).await?;
    assert!(result.is_success());
    assert!(result.into_data().is_none());
    Ok(())
}

#[tokio::test]
async fn query_users_filters_pages_and_counts() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let manager = full_manager(&store);
    for username in ["carol", "alice", "bob"] {
        manager
            .create_user(&[
                prop(claim_types::USERNAME, username),
                prop(claim_types::PASSWORD, "Sw0rdfish!"),
            ])
            .await?;
    }

    let page = manager.query_users("", 0, 10).await?.into_data().expect("page");
    let names: Vec<&str> = page.items.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, ["alice", "bob", "carol"]);
    assert_eq!(page.total, 3);
    assert_eq!(page.filter, None);

    let page = manager.query_users("ali", 0, 10).await?.into_data().expect("page");
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].username, "alice");
    assert_eq!(page.filter.as_deref(), Some("ali"));

    let page = manager.query_users("", 1, 1).await?.into_data().expect("page");
    assert_eq!(page.total, 3);
    assert_eq!(page.count, 1);
    assert_eq!(page.items[0].username, "bob");
    Ok(())
}

#[tokio::test]
async fn negative_paging_clamps_instead_of_failing() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let manager = full_manager(&store);
    create_alice(&manager).await?;

    let page = manager.query_users("", -3, -1).await?.into_data().expect("page");
    assert_eq!(page.start, 0);
    assert_eq!(page.total, 1);
    assert_eq!(page.count, 1);
    Ok(())
}

#[tokio::test]
async fn email_as_username_collapses_the_identity_surface() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::with_config(
        AccountConfig::new().email_as_username(),
    ));
    let manager = full_manager(&store);

    let created = manager
        .create_user(&[
            prop(claim_types::USERNAME, "alice@example.com"),
            prop(claim_types::PASSWORD, "Sw0rdfish!"),
        ])
        .await?;
    let subject = created.into_data().expect("payload").subject;

    let detail = manager.get_user(&subject).await?.into_data().expect("detail");
    assert_eq!(detail.username, "alice@example.com");
    assert!(detail
        .properties
        .iter()
        .all(|p| p.prop_type != claim_types::EMAIL));

    // Renaming through the username property confirms the new email
    // and renames the login in one step.
    assert!(manager
        .set_user_property(&subject, claim_types::USERNAME, "a.adams@example.com")
        .await?
        .is_success());
    let detail = manager.get_user(&subject).await?.into_data().expect("detail");
    assert_eq!(detail.username, "a.adams@example.com");
    Ok(())
}

#[tokio::test]
async fn role_lifecycle() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let manager = full_manager(&store);

    let created = manager
        .create_role(&[prop(claim_types::NAME, "admins")])
        .await?;
    let subject = created.into_data().expect("payload").subject;

    let page = manager.query_roles("", 0, 10).await?.into_data().expect("page");
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].name, "admins");

    let detail = manager.get_role(&subject).await?.into_data().expect("detail");
    assert_eq!(detail.name, "admins");
    assert_eq!(detail.properties.len(), 1);
    assert_eq!(detail.properties[0].value.as_deref(), Some("admins"));

    assert!(manager
        .set_role_property(&subject, claim_types::NAME, "administrators")
        .await?
        .is_success());
    let detail = manager.get_role(&subject).await?.into_data().expect("detail");
    assert_eq!(detail.name, "administrators");

    assert!(manager.delete_role(&subject).await?.is_success());
    let result = manager.get_role(&subject).await?;
    assert!(result.is_success());
    assert!(result.into_data().is_none());
    Ok(())
}

#[tokio::test]
async fn role_create_requires_a_name() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let manager = full_manager(&store);

    let result = manager.create_role(&[]).await?;
    assert!(!result.is_success());
    assert_eq!(result.errors(), ["Name is required"]);
    Ok(())
}

#[tokio::test]
async fn role_rename_conflict_stays_in_the_envelope() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let manager = full_manager(&store);

    manager.create_role(&[prop(claim_types::NAME, "admins")]).await?;
    let created = manager
        .create_role(&[prop(claim_types::NAME, "users")])
        .await?;
    let subject = created.into_data().expect("payload").subject;

    let result = manager
        .set_role_property(&subject, claim_types::NAME, "admins")
        .await?;
    assert!(!result.is_success());
    assert!(result.errors()[0].contains("admins"));
    Ok(())
}

#[tokio::test]
async fn role_operations_fault_without_a_group_backend() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let manager = users_only_manager(&store);

    for fault in [
        manager.query_roles("", 0, 10).await.map(|_| ()).unwrap_err(),
        manager.create_role(&[]).await.map(|_| ()).unwrap_err(),
        manager.get_role("not-even-a-uuid").await.map(|_| ()).unwrap_err(),
        manager.delete_role("also-garbage").await.map(|_| ()).unwrap_err(),
    ] {
        assert!(matches!(fault, Fault::GroupsNotSupported));
    }
    Ok(())
}

#[tokio::test]
async fn metadata_projection_matches_the_wiring() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());

    let repr = full_manager(&store).get_metadata();
    assert!(repr.role.supports_create);
    assert_eq!(repr.role_claim_type, "role");
    assert_eq!(
        repr.user.update_properties[0].prop_type,
        claim_types::USERNAME
    );

    let repr = users_only_manager(&store).get_metadata();
    assert!(!repr.role.supports_create);
    assert!(repr.role.update_properties.is_empty());
    Ok(())
}
