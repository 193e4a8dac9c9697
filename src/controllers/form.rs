// controllers/form.rs — Create / edit form with field validation.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{Game, GameInput, GamePlatform, GameStatus};

use super::{AppState, ControllerScope};

pub const TITLE_MAX_CHARS: usize = 200;
pub const RELEASE_YEAR_RANGE: std::ops::RangeInclusive<i32> = 1970..=2030;
pub const RATING_RANGE: std::ops::RangeInclusive<i32> = 1..=10;

// ---------------------------------------------------------------------------
// Form values
// ---------------------------------------------------------------------------

/// Raw field values as the user typed them. Blank strings mean "not set".
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct GameForm {
    pub title:           String,
    pub description:     String,
    pub developer:       String,
    pub publisher:       String,
    pub release_year:    Option<i32>,
    pub genre:           String,
    pub cover_image_url: String,
    pub platform:        Option<GamePlatform>,
    pub status:          GameStatus,
    pub rating:          Option<i32>,
    pub playtime_hours:  f64,
    pub notes:           String,
    pub favorite:        bool,
}

fn blank_to_none(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl GameForm {
    /// Pre-fill from an existing record.
    pub fn from_game(game: &Game) -> Self {
        Self {
            title: game.title.clone(),
            description: game.description.clone().unwrap_or_default(),
            developer: game.developer.clone().unwrap_or_default(),
            publisher: game.publisher.clone().unwrap_or_default(),
            release_year: game.release_year,
            genre: game.genre.clone().unwrap_or_default(),
            cover_image_url: game.cover_image_url.clone().unwrap_or_default(),
            platform: game.platform,
            status: game.status,
            rating: game.rating,
            playtime_hours: game.playtime_hours,
            notes: game.notes.clone().unwrap_or_default(),
            favorite: game.favorite,
        }
    }

    /// Every rule the form breaks, in field order. Empty means valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let title = self.title.trim();
        if title.is_empty() {
            errors.push("Title is required".to_string());
        } else if title.chars().count() > TITLE_MAX_CHARS {
            errors.push(format!("Title must be at most {TITLE_MAX_CHARS} characters"));
        }

        if let Some(year) = self.release_year {
            if !RELEASE_YEAR_RANGE.contains(&year) {
                errors.push(format!(
                    "Release year must be between {} and {}",
                    RELEASE_YEAR_RANGE.start(),
                    RELEASE_YEAR_RANGE.end()
                ));
            }
        }

        if let Some(rating) = self.rating {
            if !RATING_RANGE.contains(&rating) {
                errors.push(format!(
                    "Rating must be between {} and {}",
                    RATING_RANGE.start(),
                    RATING_RANGE.end()
                ));
            }
        }

        if self.playtime_hours < 0.0 || !self.playtime_hours.is_finite() {
            errors.push("Playtime cannot be negative".to_string());
        }

        errors
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Validate and build the request payload.
    pub fn to_input(&self) -> Result<GameInput> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }
        Ok(GameInput {
            title: self.title.trim().to_string(),
            description: blank_to_none(&self.description),
            developer: blank_to_none(&self.developer),
            publisher: blank_to_none(&self.publisher),
            release_year: self.release_year,
            genre: blank_to_none(&self.genre),
            cover_image_url: blank_to_none(&self.cover_image_url),
            platform: self.platform,
            status: self.status,
            rating: self.rating,
            playtime_hours: self.playtime_hours,
            notes: blank_to_none(&self.notes),
            favorite: self.favorite,
            library_app_id: None,
        })
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    New,
    Edit(i64),
}

pub struct FormController {
    state: AppState,
    scope: ControllerScope,
    mode:  FormMode,
    pub form: GameForm,
    /// Carried through an edit so a linked app id is not dropped on save.
    library_app_id: Option<String>,
}

impl FormController {
    pub fn new(state: AppState) -> Self {
        let scope = ControllerScope::new(state.notifier.clone());
        Self {
            state,
            scope,
            mode: FormMode::New,
            form: GameForm::default(),
            library_app_id: None,
        }
    }

    /// Load an existing game into the form.
    pub async fn edit(state: AppState, id: i64) -> Result<Self> {
        let mut controller = Self::new(state);
        let game = controller
            .scope
            .run(controller.state.backend.get_game(id))
            .await
            .map_err(|e| {
                if !e.is_cancelled() {
                    tracing::warn!(id, error = %e, "failed to load game for editing");
                    controller.state.notifier.error("Failed to load game");
                }
                e
            })?
            .ok_or_else(|| Error::NotFound(format!("game {id}")))?;

        controller.form = GameForm::from_game(&game);
        controller.library_app_id = game.library_app_id;
        controller.mode = FormMode::Edit(id);
        Ok(controller)
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    /// Create or update, returning the id of the saved game.
    pub async fn submit(&mut self) -> Result<i64> {
        let mut input = self.form.to_input()?;
        input.library_app_id = self.library_app_id.clone();

        let (result, done) = match self.mode {
            FormMode::New => (
                self.scope.run(self.state.backend.create_game(&input)).await,
                "Game created",
            ),
            FormMode::Edit(id) => (
                self.scope.run(self.state.backend.update_game(id, &input)).await,
                "Game updated",
            ),
        };

        let saved = match result {
            Ok(saved) => saved,
            Err(e) => {
                if !e.is_cancelled() {
                    tracing::warn!(mode = ?self.mode, error = %e, "failed to save game");
                    self.state.notifier.error("Failed to save game");
                }
                return Err(e);
            }
        };

        let id = match (saved.and_then(|g| g.id), self.mode) {
            (Some(id), _) => id,
            (None, FormMode::Edit(id)) => id,
            (None, FormMode::New) => {
                return Err(Error::Internal("backend returned no id for the new game".to_string()))
            }
        };
        self.state.notifier.success(done);
        self.mode = FormMode::Edit(id);
        Ok(id)
    }

    pub fn close(&self) {
        self.scope.close();
    }
}
