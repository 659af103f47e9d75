pub mod user;
pub mod workload;

use multikey::{CollectionError, CompositeKey, IndexedCollection};
use std::fmt::Display;
use user::{Birthday, User};

fn print_items<T: Display>(items: &[T]) {
    if items.is_empty() {
        log::info!("Collection without items");
        return;
    }

    for item in items {
        log::info!("{item}");
    }
}

/// Add, query, update and remove a single entry, logging every step.
pub fn walkthrough() -> Result<(), CollectionError> {
    let collection = IndexedCollection::<User, String, f64>::new();

    let id_key = User::new("Ivanov Petr Nikolaevich", Birthday::new(2000, 1, 1));
    let name_key = String::from("SecondKey");
    let value = 20.0;

    log::info!("add new item with id key '{id_key}', name key '{name_key}' and value '{value}'");
    collection.add(id_key.clone(), name_key.clone(), value)?;

    log::info!("items with id key '{id_key}'");
    print_items(&collection.get_by_id(&id_key)?);

    let new_value = 30.0;
    log::info!("change to new value '{new_value}'");
    collection.set(&id_key, &name_key, new_value)?;

    log::info!("items with name key '{name_key}'");
    print_items(&collection.get_by_name(&name_key)?);

    log::info!("remove item from collection");
    let current = collection.get(&id_key, &name_key)?;
    let key = CompositeKey::new(id_key, name_key);
    if collection.remove(&key, &current) {
        log::info!("remove succeeded");
    } else {
        log::info!("remove failed");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walkthrough_succeeds() {
        walkthrough().unwrap();
    }
}
