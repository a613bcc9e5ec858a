use sqlx::SqlitePool;
use thiserror::Error;
use uuid::Uuid;

use crate::services::store::{self, HabitFilter, StoreError};
use shared::{CreateHabitRequest, Habit, HabitSection, MoveHabitRequest, TimeOfDay, UpdateHabitRequest};

#[derive(Debug, Error)]
pub enum HabitError {
    #[error("Habit not found")]
    NotFound,
    #[error("Cannot move position {from} to {to} in a list of {len}")]
    InvalidMove { from: usize, to: usize, len: usize },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// All habits grouped by slot, slots in day order
pub async fn list_sections(pool: &SqlitePool) -> Result<Vec<HabitSection>, HabitError> {
    let mut conn = pool.acquire().await.map_err(StoreError::from)?;
    let habits = store::query_habits(&mut conn, HabitFilter::default()).await?;
    Ok(group_by_slot(habits))
}

fn group_by_slot(habits: Vec<Habit>) -> Vec<HabitSection> {
    let mut sections: Vec<HabitSection> = TimeOfDay::ALL
        .iter()
        .map(|&time_of_day| HabitSection {
            time_of_day,
            habits: Vec::new(),
        })
        .collect();

    for habit in habits {
        if let Some(section) = sections.iter_mut().find(|s| s.time_of_day == habit.time_of_day) {
            section.habits.push(habit);
        }
    }
    sections
}

pub async fn get_habit(pool: &SqlitePool, habit_id: &Uuid) -> Result<Habit, HabitError> {
    let mut conn = pool.acquire().await.map_err(StoreError::from)?;
    store::get_habit(&mut conn, habit_id)
        .await?
        .ok_or(HabitError::NotFound)
}

/// Create a habit at the end of its slot
pub async fn create_habit(pool: &SqlitePool, request: &CreateHabitRequest) -> Result<Habit, HabitError> {
    let mut tx = store::begin(pool).await?;

    let habit = Habit {
        id: Uuid::new_v4(),
        name: request.name.trim().to_string(),
        time_of_day: request.time_of_day,
        is_completed: false,
        streak: 0,
        last_completed_date: None,
        order: store::next_order(&mut tx, request.time_of_day).await?,
    };
    store::insert_habit(&mut tx, &habit).await?;
    store::commit(tx).await?;

    log::info!("Created habit {} in {}", habit.id, habit.time_of_day);
    Ok(habit)
}

/// Rename a habit and/or move it to another slot.
/// A habit that changes slot is appended to the end of the new slot.
pub async fn update_habit(
    pool: &SqlitePool,
    habit_id: &Uuid,
    request: &UpdateHabitRequest,
) -> Result<Habit, HabitError> {
    let mut tx = store::begin(pool).await?;

    let mut habit = store::get_habit(&mut tx, habit_id)
        .await?
        .ok_or(HabitError::NotFound)?;

    if let Some(ref name) = request.name {
        habit.name = name.trim().to_string();
    }
    if let Some(time_of_day) = request.time_of_day {
        if time_of_day != habit.time_of_day {
            habit.order = store::next_order(&mut tx, time_of_day).await?;
            habit.time_of_day = time_of_day;
        }
    }

    store::update_habit(&mut tx, &habit).await?;
    store::commit(tx).await?;

    Ok(habit)
}

pub async fn delete_habit(pool: &SqlitePool, habit_id: &Uuid) -> Result<(), HabitError> {
    let mut conn = pool.acquire().await.map_err(StoreError::from)?;
    if !store::delete_habit(&mut conn, habit_id).await? {
        return Err(HabitError::NotFound);
    }
    log::info!("Deleted habit {}", habit_id);
    Ok(())
}

/// Reorder a slot and renumber its habits `0..n`. Returns the slot's new order.
pub async fn move_habit(pool: &SqlitePool, request: &MoveHabitRequest) -> Result<Vec<Habit>, HabitError> {
    let mut tx = store::begin(pool).await?;

    let mut habits = store::query_habits(&mut tx, HabitFilter::slot(request.time_of_day)).await?;
    apply_move(&mut habits, request.from, request.to)?;

    for (position, habit) in habits.iter_mut().enumerate() {
        let order = position as i32;
        if habit.order != order {
            habit.order = order;
            store::update_habit(&mut tx, habit).await?;
        }
    }
    store::commit(tx).await?;

    Ok(habits)
}

/// Remove the element at `from` and insert it before the element originally at `to`.
pub fn apply_move<T>(items: &mut Vec<T>, from: usize, to: usize) -> Result<(), HabitError> {
    let len = items.len();
    if from >= len || to > len {
        return Err(HabitError::InvalidMove { from, to, len });
    }

    let item = items.remove(from);
    let target = if to > from { to - 1 } else { to };
    items.insert(target, item);
    Ok(())
}
