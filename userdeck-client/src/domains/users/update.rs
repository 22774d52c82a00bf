use log::{debug, info, warn};

use crate::common::debounce::Push;
use crate::common::task::Task;
use crate::domains::network::ConnectivityEvent;
use crate::domains::users::messages::Message;
use crate::domains::users::view_model::NotificationKind;
use crate::domains::users::{Dashboard, LoadState};
use crate::infra::errors::SyncError;

/// Handle users domain messages
pub fn update_users(state: &mut Dashboard, message: Message) -> Task<Message> {
    debug!("Users update: {}", message.name());

    match message {
        // View state
        Message::SearchInput(text) => {
            state.view_state.set_search_text(text.clone());
            match state.search.push(text) {
                Push::Immediate(settled) => settle_search(state, settled),
                Push::Scheduled(timer) => timer.into_task(Message::SearchSettled),
            }
        }

        Message::SearchSettled(generation) => match state.search.fire(generation) {
            Some(settled) => settle_search(state, settled),
            None => Task::none(),
        },

        Message::StatusFilterChanged(status) => {
            if state.view_state.set_status(status) {
                state.load()
            } else {
                Task::none()
            }
        }

        Message::PageChanged(page) => {
            if state.view_state.set_page(page) {
                state.load()
            } else {
                Task::none()
            }
        }

        Message::PageSizeChanged(page_size) => {
            if state.view_state.set_page_size(page_size) {
                state.load()
            } else {
                Task::none()
            }
        }

        // Remote data
        Message::UsersLoaded { params, result } => {
            if params != state.view_state.params() {
                debug!(
                    "[Users] Ignoring result for superseded params {:?}",
                    params
                );
                return Task::none();
            }

            match result {
                Ok(page) => {
                    debug!(
                        "[Users] Showing {} of {} users",
                        page.users.len(),
                        page.total_count
                    );
                    state.load_state = if !state.network.is_online() {
                        LoadState::Offline
                    } else if state.cache.is_fetching(&params) {
                        LoadState::Fetching
                    } else {
                        LoadState::Idle
                    };
                }
                Err(SyncError::Cancelled) => {
                    debug!("[Users] Fetch cancelled");
                }
                Err(err) => {
                    if is_offline_failure(state, &err) {
                        warn!("[Users] Backend unreachable: {}", err);
                        state.load_state = LoadState::Offline;
                    } else {
                        warn!("[Users] Failed to load users: {}", err);
                        state.load_state = LoadState::Error(err.to_string());
                    }
                }
            }
            Task::none()
        }

        Message::CacheChanged => {
            if matches!(state.load_state, LoadState::Error(_) | LoadState::Offline)
            {
                // Errors are only left through an explicit retry.
                return Task::none();
            }
            state.load()
        }

        Message::ToggleStatus(user_id) => {
            if state.pending_toggles.contains(&user_id) {
                debug!("[Users] Update for {} already pending", user_id);
                return Task::none();
            }
            let params = state.view_state.params();
            let Some(user) = state
                .cache
                .peek(&params)
                .and_then(|page| page.find(&user_id).cloned())
            else {
                warn!("[Users] Cannot toggle {}: not on the current page", user_id);
                return Task::none();
            };

            let status = user.status.toggled();
            info!("[Users] Setting {} ({}) to {}", user.name, user_id, status);
            state.pending_toggles.insert(user_id.clone());
            let future = state.cache.mutate_status(user_id.clone(), status);
            Task::perform(future, move |result| Message::StatusUpdated {
                user_id,
                status,
                result,
            })
        }

        Message::StatusUpdated {
            user_id,
            status,
            result,
        } => {
            state.pending_toggles.remove(&user_id);
            let notice = match result {
                Ok(ack) => {
                    info!("[Users] {} is now {}", user_id, status);
                    state.notify(NotificationKind::Success, ack.message)
                }
                Err(SyncError::MutationFailure {
                    network: true, ..
                }) => state.notify(
                    NotificationKind::Error,
                    "Could not reach the server. The status change was rolled back.",
                ),
                Err(err) => state.notify(NotificationKind::Error, err.to_string()),
            };
            Task::batch([notice, state.load()])
        }

        Message::Retry => {
            info!("[Users] Retrying");
            state.load_state = LoadState::Idle;
            state.load()
        }

        Message::Connectivity(event) => {
            // No-op when forwarded from the monitor's own channel.
            state.network.handle(event);
            match event {
                ConnectivityEvent::Offline => {
                    state.load_state = LoadState::Offline;
                    Task::none()
                }
                ConnectivityEvent::Online
                    if state.load_state == LoadState::Offline =>
                {
                    info!("[Users] Back online, refetching");
                    state.load()
                }
                ConnectivityEvent::Online => Task::none(),
            }
        }

        // Grid preferences
        Message::SetColumnVisible { column, visible } => {
            state.grid.set_column_visible(column, visible);
            save_preferences(state);
            Task::none()
        }

        Message::SetSorting(sorting) => {
            state.grid.sorting = sorting;
            save_preferences(state);
            Task::none()
        }

        Message::SetDensity(density) => {
            state.grid.density = density;
            save_preferences(state);
            Task::none()
        }

        Message::ResetPreferences => {
            state.grid = state.preferences.reset(&state.view_id);
            Task::none()
        }

        Message::DismissNotification(id) => {
            state.notifications.retain(|notification| notification.id != id);
            Task::none()
        }
    }
}

fn settle_search(state: &mut Dashboard, settled: String) -> Task<Message> {
    if state.view_state.settle_search(settled) {
        state.load()
    } else {
        Task::none()
    }
}

fn save_preferences(state: &Dashboard) {
    state.preferences.save(&state.view_id, &state.grid);
}

fn is_offline_failure(state: &Dashboard, err: &SyncError) -> bool {
    matches!(err, SyncError::NetworkUnreachable(_))
        || state.network.is_network_error(err)
}
