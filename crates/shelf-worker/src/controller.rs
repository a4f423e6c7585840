//! Page to controlling worker assignment.

use std::collections::BTreeMap;

use crate::worker::WorkerId;

/// An open page (client) of the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(u64);

impl std::fmt::Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "page-{}", self.0)
    }
}

/// Which worker, if any, controls each open page.
#[derive(Debug, Default)]
pub struct ControllerAssignment {
    next_page: u64,
    pages: BTreeMap<PageId, Option<WorkerId>>,
}

impl ControllerAssignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a page controlled by `controller`.
    pub fn open(&mut self, controller: Option<WorkerId>) -> PageId {
        self.next_page += 1;
        let page = PageId(self.next_page);
        self.pages.insert(page, controller);
        page
    }

    /// Close a page. Returns false if it was not open.
    pub fn close(&mut self, page: PageId) -> bool {
        self.pages.remove(&page).is_some()
    }

    pub fn controller_of(&self, page: PageId) -> Option<WorkerId> {
        self.pages.get(&page).copied().flatten()
    }

    /// Apply an activation in one step.
    ///
    /// Pages controlled by `previous` move to `activated`. With `claim`,
    /// uncontrolled pages are taken as well. Returns the number of pages whose
    /// controller changed.
    pub fn assign_on_activation(
        &mut self,
        previous: Option<WorkerId>,
        activated: WorkerId,
        claim: bool,
    ) -> usize {
        let mut changed = 0;
        for controller in self.pages.values_mut() {
            let take = match *controller {
                Some(current) => Some(current) == previous && current != activated,
                None => claim,
            };
            if take {
                *controller = Some(activated);
                changed += 1;
            }
        }
        changed
    }
}
