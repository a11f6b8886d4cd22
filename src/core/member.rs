//! Member business logic - The church roster.
//!
//! Provides membership applications, the admin roster listing and editing, and
//! member authentication. Credentials are stored as Argon2 hashes only. Email
//! addresses are matched case-insensitively and are not required to be unique;
//! authentication accepts the first member whose email and password both match.

use crate::{
    core::{
        new_id,
        password::{hash_password, verify_password},
        required,
        update::double_option,
        validate_email,
    },
    entities::{Member, MembershipType, member},
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::Condition;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

/// Fields submitted by the membership application form.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipApplication {
    /// Individual or family membership
    pub membership_type: MembershipType,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Contact email
    pub email: String,
    /// Contact phone
    pub phone: String,
    /// Street address
    pub address: String,
    /// City
    pub city: String,
    /// State
    pub state: String,
    /// Postal code
    pub zip_code: String,
    /// Date of birth
    pub birth_date: NaiveDate,
    /// Chosen password, hashed before storage
    pub password: String,
    /// Spouse name (family memberships)
    #[serde(default)]
    pub spouse_name: Option<String>,
    /// Wedding date (family memberships)
    #[serde(default)]
    pub anniversary_date: Option<NaiveDate>,
    /// Children (family memberships)
    #[serde(default)]
    pub children: Option<String>,
    /// Ministry interests
    #[serde(default)]
    pub ministry_interests: Option<String>,
    /// Additional notes
    #[serde(default)]
    pub notes: Option<String>,
}

/// Field-level changes to a member record. Unset fields are left alone.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberUpdate {
    pub membership_type: Option<MembershipType>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub birth_date: Option<NaiveDate>,
    /// New password, re-hashed on update
    pub password: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub spouse_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub anniversary_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    pub children: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub ministry_interests: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

fn validate_password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(Error::validation("password", "must not be empty"));
    }
    Ok(())
}

/// Retrieves the whole roster ordered by last name, then first name.
pub async fn list_members(db: &DatabaseConnection) -> Result<Vec<member::Model>> {
    Member::find()
        .order_by_asc(member::Column::LastName)
        .order_by_asc(member::Column::FirstName)
        .all(db)
        .await
        .map_err(Into::into)
}

fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Roster entries whose first name, last name, email or phone contain `term`,
/// ignoring case. A blank term returns the whole roster.
#[instrument(skip(db))]
pub async fn search_members(db: &DatabaseConnection, term: &str) -> Result<Vec<member::Model>> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return list_members(db).await;
    }

    let pattern = format!("%{}%", escape_like(&term));
    let any_column = [
        member::Column::FirstName,
        member::Column::LastName,
        member::Column::Email,
        member::Column::Phone,
    ]
    .into_iter()
    .fold(Condition::any(), |condition, column| {
        condition.add(
            Expr::expr(Func::lower(Expr::col(column)))
                .like(LikeExpr::new(pattern.clone()).escape('\\')),
        )
    });

    let found = Member::find()
        .filter(any_column)
        .order_by_asc(member::Column::LastName)
        .order_by_asc(member::Column::FirstName)
        .all(db)
        .await?;
    debug!(matches = found.len(), "Member search");
    Ok(found)
}

/// Finds a member by id, returning None if not found.
pub async fn get_member_by_id(db: &DatabaseConnection, id: &str) -> Result<Option<member::Model>> {
    Member::find_by_id(id).one(db).await.map_err(Into::into)
}

/// Accepts a membership application, hashing the password and stamping id and time.
#[instrument(skip(db, application), fields(email = %application.email))]
pub async fn apply_for_membership(
    db: &DatabaseConnection,
    application: MembershipApplication,
) -> Result<member::Model> {
    let first_name = required("first_name", &application.first_name)?;
    let last_name = required("last_name", &application.last_name)?;
    let email = validate_email(&application.email)?;
    validate_password(&application.password)?;
    let password_hash = hash_password(&application.password)?;

    let model = member::ActiveModel {
        id: Set(new_id()),
        membership_type: Set(application.membership_type),
        first_name: Set(first_name),
        last_name: Set(last_name),
        email: Set(email),
        phone: Set(application.phone.trim().to_string()),
        address: Set(application.address.trim().to_string()),
        city: Set(application.city.trim().to_string()),
        state: Set(application.state.trim().to_string()),
        zip_code: Set(application.zip_code.trim().to_string()),
        birth_date: Set(application.birth_date),
        password_hash: Set(password_hash),
        spouse_name: Set(optional_text(application.spouse_name)),
        anniversary_date: Set(application.anniversary_date),
        children: Set(optional_text(application.children)),
        ministry_interests: Set(optional_text(application.ministry_interests)),
        notes: Set(optional_text(application.notes)),
        created_at: Set(Utc::now()),
    };

    let created = model.insert(db).await?;
    info!(member_id = %created.id, "Membership application accepted");
    Ok(created)
}

fn merge_update(mut current: member::Model, update: MemberUpdate) -> Result<member::Model> {
    if let Some(membership_type) = update.membership_type {
        current.membership_type = membership_type;
    }
    if let Some(first_name) = update.first_name {
        current.first_name = required("first_name", &first_name)?;
    }
    if let Some(last_name) = update.last_name {
        current.last_name = required("last_name", &last_name)?;
    }
    if let Some(email) = update.email {
        current.email = validate_email(&email)?;
    }
    if let Some(phone) = update.phone {
        current.phone = phone.trim().to_string();
    }
    if let Some(address) = update.address {
        current.address = address.trim().to_string();
    }
    if let Some(city) = update.city {
        current.city = city.trim().to_string();
    }
    if let Some(state) = update.state {
        current.state = state.trim().to_string();
    }
    if let Some(zip_code) = update.zip_code {
        current.zip_code = zip_code.trim().to_string();
    }
    if let Some(birth_date) = update.birth_date {
        current.birth_date = birth_date;
    }
    if let Some(password) = update.password {
        validate_password(&password)?;
        current.password_hash = hash_password(&password)?;
    }
    if let Some(spouse_name) = update.spouse_name {
        current.spouse_name = optional_text(spouse_name);
    }
    if let Some(anniversary_date) = update.anniversary_date {
        current.anniversary_date = anniversary_date;
    }
    if let Some(children) = update.children {
        current.children = optional_text(children);
    }
    if let Some(ministry_interests) = update.ministry_interests {
        current.ministry_interests = optional_text(ministry_interests);
    }
    if let Some(notes) = update.notes {
        current.notes = optional_text(notes);
    }
    Ok(current)
}

/// Updates a member record, returning None if the member does not exist.
#[instrument(skip(db, update))]
pub async fn update_member(
    db: &DatabaseConnection,
    id: &str,
    update: MemberUpdate,
) -> Result<Option<member::Model>> {
    let Some(current) = get_member_by_id(db, id).await? else {
        debug!("Member not found for update");
        return Ok(None);
    };
    let merged = merge_update(current, update)?;
    let updated = member::ActiveModel::from(merged)
        .reset_all()
        .update(db)
        .await?;
    info!(member_id = %updated.id, "Member updated");
    Ok(Some(updated))
}

/// Removes a member by id. Returns true iff a row was removed.
#[instrument(skip(db))]
pub async fn delete_member(db: &DatabaseConnection, id: &str) -> Result<bool> {
    let result = Member::delete_by_id(id).exec(db).await?;
    let removed = result.rows_affected > 0;
    info!(removed, "Member delete processed");
    Ok(removed)
}

/// Replaces the whole roster in one transaction.
///
/// Records are stored as given, including their password hashes.
#[instrument(skip(db, members), fields(count = members.len()))]
pub async fn replace_all_members(
    db: &DatabaseConnection,
    members: Vec<member::Model>,
) -> Result<()> {
    let txn = db.begin().await?;
    Member::delete_many().exec(&txn).await?;
    for model in members {
        member::ActiveModel::from(model)
            .reset_all()
            .insert(&txn)
            .await?;
    }
    txn.commit().await?;
    info!("Member roster replaced");
    Ok(())
}

/// Checks an email/password pair, returning the matching member.
///
/// Returns `Ok(None)` when no member has that email or the password does not match.
#[instrument(skip(db, password))]
pub async fn authenticate_member(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
) -> Result<Option<member::Model>> {
    let candidates = Member::find()
        .filter(
            Expr::expr(Func::lower(Expr::col(member::Column::Email)))
                .eq(email.trim().to_lowercase()),
        )
        .order_by_asc(member::Column::CreatedAt)
        .all(db)
        .await?;

    let member = candidates
        .into_iter()
        .find(|candidate| verify_password(password, &candidate.password_hash));
    if member.is_none() {
        warn!("Authentication failed");
    }
    Ok(member)
}
