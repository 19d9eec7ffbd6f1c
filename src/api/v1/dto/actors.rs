/*
 * Responsibility
 * - Actors の request/response DTO
 * - validate() で必須項目 / age の範囲をチェック (→ 422)
 */
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateActorRequest {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
}

/// Validated create payload.
#[derive(Debug, PartialEq, Eq)]
pub struct NewActor<'a> {
    pub name: &'a str,
    pub age: i32,
    pub gender: &'a str,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl CreateActorRequest {
    pub fn validate(&self) -> Result<NewActor<'_>, &'static str> {
        let name = non_blank(self.name.as_deref()).ok_or("name is required")?;
        let age = self.age.ok_or("age is required")?;
        if age <= 0 {
            return Err("age must be a positive number");
        }
        let gender = non_blank(self.gender.as_deref()).ok_or("gender is required")?;

        Ok(NewActor { name, age, gender })
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateActorRequest {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
}

impl UpdateActorRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.name.is_none() && self.age.is_none() && self.gender.is_none() {
            return Err("nothing to update: provide name, age and/or gender");
        }
        if let Some(name) = &self.name
            && name.trim().is_empty()
        {
            return Err("name cannot be empty");
        }
        if let Some(age) = self.age
            && age <= 0
        {
            return Err("age must be a positive number");
        }
        if let Some(gender) = &self.gender
            && gender.trim().is_empty()
        {
            return Err("gender cannot be empty");
        }

        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct ActorResponse {
    pub id: String, // encoded
    pub name: String,
    pub age: i32,
    pub gender: String,
}

#[derive(Debug, Serialize)]
pub struct ActorEnvelope {
    pub actor: ActorResponse,
}

#[derive(Debug, Serialize)]
pub struct ActorListResponse {
    pub actors: Vec<ActorResponse>,
}
