use crate::db::table::TableName;
use crate::records::DayRecord;
use serde::{Deserialize, Serialize};

/// Millisecond creation timestamp, bumped past the day's largest id when the clock collides.
pub type TodoId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    pub id: TodoId,
    pub text: String,
    pub done: bool,
}

impl TodoItem {
    pub fn new(id: TodoId, text: &str) -> Option<Self> {
        let text = text.trim();
        (!text.is_empty()).then(|| Self {
            id,
            text: text.to_string(),
            done: false,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoList(Vec<TodoItem>);

impl TodoList {
    pub fn items(&self) -> &[TodoItem] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn done_count(&self) -> usize {
        self.0.iter().filter(|item| item.done).count()
    }

    pub fn next_id(&self, now_millis: i64) -> TodoId {
        self.0
            .iter()
            .map(|item| item.id)
            .max()
            .map_or(now_millis, |largest| now_millis.max(largest + 1))
    }

    pub fn push(&mut self, item: TodoItem) {
        self.0.push(item);
    }

    pub fn toggle(&mut self, id: TodoId) -> bool {
        self.0
            .iter_mut()
            .filter(|item| item.id == id)
            .fold(false, |_, item| {
                item.done = !item.done;
                true
            })
    }

    pub fn remove(&mut self, id: TodoId) -> bool {
        let before = self.0.len();
        self.0.retain(|item| item.id != id);
        self.0.len() != before
    }
}

impl FromIterator<TodoItem> for TodoList {
    fn from_iter<T: IntoIterator<Item = TodoItem>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl DayRecord for TodoList {
    const TABLE: TableName = TableName::DayTodos;

    type Patch = TodoList;

    fn apply(&mut self, patch: TodoList) {
        *self = patch;
    }
}

#[cfg(test)]
mod tests {
    use super::{TodoItem, TodoList};

    #[test]
    fn rejects_blank_text_and_trims() {
        assert_eq!(TodoItem::new(1, "   "), None);
        assert_eq!(TodoItem::new(1, " buy milk ").unwrap().text, "buy milk");
    }

    #[test]
    fn next_id_never_repeats_within_a_day() {
        let mut list = TodoList::default();
        assert_eq!(list.next_id(1_000), 1_000);

        list.push(TodoItem::new(1_000, "a").unwrap());
        assert_eq!(list.next_id(1_000), 1_001);
        assert_eq!(list.next_id(5_000), 5_000);
    }

    #[test]
    fn toggle_and_remove_by_id() {
        let mut list = [1, 2, 3]
            .into_iter()
            .map(|id| TodoItem::new(id, &format!("task {id}")).unwrap())
            .collect::<TodoList>();

        assert!(list.toggle(2));
        assert!(!list.toggle(9));
        assert_eq!(list.done_count(), 1);

        assert!(list.remove(1));
        assert!(!list.remove(1));
        let ids = list.items().iter().map(|item| item.id).collect::<Vec<_>>();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn stored_as_plain_array() {
        let list = TodoList::from_iter([TodoItem::new(7, "stretch").unwrap()]);
        assert_eq!(
            serde_json::to_string(&list).unwrap(),
            r#"[{"id":7,"text":"stretch","done":false}]"#
        );
    }
}
