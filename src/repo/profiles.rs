// src/repo/profiles.rs
//
// Profile feed composition and own-profile CRUD. The one-profile-per-
// user invariant lives on the `user_profiles.user_id` unique index;
// violations surface as `ProfileError::AlreadyExists` for the handler
// to translate.

use std::collections::HashMap;

use sqlx::PgPool;

use crate::models::{
    profile::{ProfileDetail, ProfileListItem, UserProfile},
    user::PublicUser,
};

#[derive(Debug)]
pub enum ProfileError {
    /// A profile already exists for this user.
    AlreadyExists,
    Db(sqlx::Error),
}

impl From<sqlx::Error> for ProfileError {
    fn from(err: sqlx::Error) -> Self {
        ProfileError::Db(err)
    }
}

pub async fn create_profile(
    pool: &PgPool,
    user_id: i64,
    bio: &str,
    picture: Option<&str>,
) -> Result<UserProfile, ProfileError> {
    sqlx::query_as::<_, UserProfile>(
        r#"
        INSERT INTO user_profiles (user_id, bio, picture)
        VALUES ($1, $2, $3)
        RETURNING id, user_id, bio, picture, created_at
        "#,
    )
    .bind(user_id)
    .bind(bio)
    .bind(picture)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if e.as_database_error()
            .is_some_and(|db| db.is_unique_violation())
        {
            ProfileError::AlreadyExists
        } else {
            ProfileError::Db(e)
        }
    })
}

pub async fn my_profile(pool: &PgPool, user_id: i64) -> Result<Option<UserProfile>, sqlx::Error> {
    sqlx::query_as::<_, UserProfile>(
        "SELECT id, user_id, bio, picture, created_at FROM user_profiles WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub async fn update_my_profile(
    pool: &PgPool,
    user_id: i64,
    bio: &str,
    picture: Option<&str>,
) -> Result<Option<UserProfile>, sqlx::Error> {
    sqlx::query_as::<_, UserProfile>(
        r#"
        UPDATE user_profiles
        SET bio = $1, picture = $2
        WHERE user_id = $3
        RETURNING id, user_id, bio, picture, created_at
        "#,
    )
    .bind(bio)
    .bind(picture)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub async fn delete_my_profile(pool: &PgPool, user_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM user_profiles WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// All-profiles feed: everyone except the requester, with a follower
/// count and an optional case-insensitive username filter. Stable
/// ordering by primary key.
pub async fn list_profiles(
    pool: &PgPool,
    requester: i64,
    username: Option<&str>,
) -> Result<Vec<ProfileListItem>, sqlx::Error> {
    sqlx::query_as::<_, ProfileListItem>(
        r#"
        SELECT pr.id, pr.user_id, u.username, pr.bio, pr.picture,
               (SELECT COUNT(*) FROM profile_followers pf WHERE pf.profile_id = pr.id) AS followers_amount
        FROM user_profiles pr
        JOIN users u ON u.id = pr.user_id
        WHERE pr.user_id <> $1
          AND ($2::TEXT IS NULL OR u.username ILIKE '%' || $2 || '%')
        ORDER BY pr.id
        "#,
    )
    .bind(requester)
    .bind(username)
    .fetch_all(pool)
    .await
}

/// Detail lookup through the same exclusion as the list: the
/// requester's own profile is not reachable here.
pub async fn profile_detail(
    pool: &PgPool,
    requester: i64,
    profile_id: i64,
) -> Result<Option<ProfileDetail>, sqlx::Error> {
    let profile = sqlx::query_as::<_, ProfileDetail>(
        r#"
        SELECT pr.id, pr.user_id, u.username, pr.bio, pr.picture
        FROM user_profiles pr
        JOIN users u ON u.id = pr.user_id
        WHERE pr.id = $1 AND pr.user_id <> $2
        "#,
    )
    .bind(profile_id)
    .bind(requester)
    .fetch_optional(pool)
    .await?;

    match profile {
        Some(profile) => Ok(attach_followers(pool, vec![profile]).await?.pop()),
        None => Ok(None),
    }
}

/// Profiles whose `followed_by` set contains the requester.
pub async fn following(pool: &PgPool, user_id: i64) -> Result<Vec<ProfileDetail>, sqlx::Error> {
    let profiles = sqlx::query_as::<_, ProfileDetail>(
        r#"
        SELECT pr.id, pr.user_id, u.username, pr.bio, pr.picture
        FROM user_profiles pr
        JOIN users u ON u.id = pr.user_id
        JOIN profile_followers pf ON pf.profile_id = pr.id AND pf.user_id = $1
        ORDER BY pr.id
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    attach_followers(pool, profiles).await
}

/// Users following the requester's profile. `None` when the requester
/// has no profile yet.
pub async fn my_followers(
    pool: &PgPool,
    user_id: i64,
) -> Result<Option<Vec<PublicUser>>, sqlx::Error> {
    let profile_id =
        sqlx::query_scalar::<_, i64>("SELECT id FROM user_profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

    let Some(profile_id) = profile_id else {
        return Ok(None);
    };

    let followers = sqlx::query_as::<_, PublicUser>(
        r#"
        SELECT u.id, u.username, u.email
        FROM profile_followers pf
        JOIN users u ON u.id = pf.user_id
        WHERE pf.profile_id = $1
        ORDER BY pf.created_at ASC
        "#,
    )
    .bind(profile_id)
    .fetch_all(pool)
    .await?;

    Ok(Some(followers))
}

/// Batch-prefetch follower usernames for a page of profile details.
async fn attach_followers(
    pool: &PgPool,
    mut profiles: Vec<ProfileDetail>,
) -> Result<Vec<ProfileDetail>, sqlx::Error> {
    if profiles.is_empty() {
        return Ok(profiles);
    }

    let ids: Vec<i64> = profiles.iter().map(|p| p.id).collect();

    let rows = sqlx::query_as::<_, (i64, String)>(
        r#"
        SELECT pf.profile_id, u.username
        FROM profile_followers pf
        JOIN users u ON u.id = pf.user_id
        WHERE pf.profile_id = ANY($1)
        ORDER BY pf.created_at ASC
        "#,
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let mut by_profile: HashMap<i64, Vec<String>> = HashMap::new();
    for (profile_id, username) in rows {
        by_profile.entry(profile_id).or_default().push(username);
    }

    for profile in &mut profiles {
        if let Some(followers) = by_profile.remove(&profile.id) {
            profile.followed_by = followers;
        }
    }

    Ok(profiles)
}
