//! Mutation workflows and the optimistic patches they apply on success.
//!
//! Each workflow checks its preconditions locally, disables its control for
//! the request, and on success patches the snapshot and re-renders the
//! touched rows instead of reloading the whole list.

use crate::controller::WantedController;
use crate::controls::ControlId;
use crate::error::{PreconditionError, Result, WantedError};
use crate::grid::GridWidget;
use crate::notify::Notifier;
use crate::selection::BulkMode;
use tracing::{debug, info, warn};
use wanted_client::WantedApi;
use wanted_models::{
    AssignOutcome, BulkPushResult, ExternalSource, MergePreview, PushMode, PushOptions, PushStatus,
    RecordId, Service, WantedRecord,
};

impl<A, G, N> WantedController<A, G, N>
where
    A: WantedApi,
    G: GridWidget,
    N: Notifier,
{
    /// Save an external id for a record, then clear its "missing" flag where
    /// the source applies. Presence is only ever set, when the response
    /// reports the record already downstream.
    pub async fn assign_external(
        &mut self,
        id: &RecordId,
        source: ExternalSource,
        external_id: &str,
        link: Option<&str>,
    ) -> Result<AssignOutcome> {
        let external_id = external_id.trim();
        if !self.snapshot.contains(id) {
            return Err(WantedError::UnknownRecord(id.clone()));
        }
        let control = ControlId::AssignExternal(id.clone());
        self.begin_control(&control)?;

        let outcome = match self.api.assign_external(id, source, external_id, link).await {
            Ok(outcome) => outcome,
            Err(e) => return Err(self.report_failure(Some(&control), "Could not save external id", e)),
        };

        self.patch_record(id, |record| {
            record.assign_external(source, external_id);
            for service in Service::ALL {
                if service.required_source() == source
                    && service.media_kind() == record.media_type
                    && outcome.present_in(service)
                {
                    record.set_in_service(service, true);
                }
            }
        });
        info!("Assigned {} id {} to {}", source.as_str(), external_id, id);

        self.controls.finish(&control);
        self.notifier
            .success(&format!("{} id saved", source.as_str().to_uppercase()));
        self.after_mutation();
        Ok(outcome)
    }

    /// Push one record to a service.
    ///
    /// A fresh add records the root folder and enters the pending poller;
    /// presence arrives with the reload that resolves it. An update, or an
    /// add the service already had, is marked present right away.
    pub async fn push(
        &mut self,
        service: Service,
        mode: PushMode,
        id: &RecordId,
        options: &PushOptions,
    ) -> Result<PushStatus> {
        if !options.is_complete() {
            return Err(PreconditionError::MissingPushOptions(service).into());
        }
        let record = self
            .snapshot
            .lookup(id, &self.grid)
            .ok_or_else(|| WantedError::UnknownRecord(id.clone()))?;
        let eligible = match mode {
            PushMode::Add => record.is_add_eligible(service) && !self.poller.registry.contains(id),
            PushMode::Update => record.is_update_eligible(service),
        };
        if !eligible {
            return Err(PreconditionError::NotEligible {
                id: id.clone(),
                service,
                mode,
            }
            .into());
        }

        let control = ControlId::Push(service, id.clone());
        self.begin_control(&control)?;

        let status = match self.api.push(service, mode, id, options).await {
            Ok(status) => status,
            Err(e) => {
                let context = format!("{} {} failed", service.display_name(), mode.as_str());
                return Err(self.report_failure(Some(&control), &context, e));
            }
        };

        match status {
            PushStatus::Added => {
                self.set_root_folder(id, service, &options.root_folder);
                self.mark_pending(id);
                self.poller.schedule(self.settings.single_poll_delay);
            }
            PushStatus::Exists => self.mark_present(id, service, None),
            PushStatus::Updated => self.mark_present(id, service, Some(&options.root_folder)),
        }
        info!("{} {} for {}: {:?}", service.display_name(), mode.as_str(), id, status);

        self.controls.confirm(&control);
        self.notifier
            .success(&format!("Sent to {}", service.display_name()));
        self.after_mutation();
        tokio::time::sleep(self.settings.confirm_delay).await;
        self.controls.finish(&control);
        self.refresh_bulk_state();
        Ok(status)
    }

    /// Push every eligible selected record in one request.
    ///
    /// The selection must be all-add or all-update for the service.
    pub async fn bulk_push(&mut self, service: Service, options: &PushOptions) -> Result<BulkPushResult> {
        self.refresh_bulk_state();
        let mode = match self.bulk_mode(service) {
            BulkMode::Add => PushMode::Add,
            BulkMode::Update => PushMode::Update,
            BulkMode::Mixed => return Err(self.reject(PreconditionError::MixedSelection(service))),
            BulkMode::None if self.selection.is_empty() => {
                return Err(self.reject(PreconditionError::EmptySelection))
            }
            BulkMode::None => return Err(self.reject(PreconditionError::NothingEligible(service))),
        };
        if !options.is_complete() {
            return Err(self.reject(PreconditionError::MissingPushOptions(service)));
        }
        let ids = self
            .selection
            .eligible_for(service, mode, &mut self.snapshot, &self.grid);

        let control = ControlId::BulkPush(service);
        self.begin_control(&control)?;
        debug!(
            "Bulk {} of {} ids to {}",
            mode.as_str(),
            ids.len(),
            service.as_str()
        );

        let result = match self.api.bulk_push(service, mode, &ids, options).await {
            Ok(result) => result,
            Err(e) => {
                let context = format!("Bulk {} to {} failed", mode.as_str(), service.display_name());
                return Err(self.report_failure(Some(&control), &context, e));
            }
        };

        match mode {
            PushMode::Add => {
                for id in &result.added_ids {
                    self.set_root_folder(id, service, &options.root_folder);
                    self.mark_pending(id);
                }
                for id in &result.skipped_ids {
                    self.mark_present(id, service, None);
                }
                if !result.added_ids.is_empty() {
                    self.poller.schedule(self.settings.bulk_poll_delay);
                }
            }
            PushMode::Update => {
                for id in result.touched_ids() {
                    self.mark_present(&id, service, Some(&options.root_folder));
                }
            }
        }
        info!(
            "Bulk {} to {}: {} added, {} skipped, {} errors",
            mode.as_str(),
            service.as_str(),
            result.added,
            result.skipped,
            result.errors
        );

        self.controls.confirm(&control);
        if result.errors > 0 || !result.error_ids.is_empty() {
            self.notifier.warning(&format!(
                "{}: {} sent, {} skipped, {} failed",
                service.display_name(),
                result.added,
                result.skipped,
                result.errors.max(result.error_ids.len())
            ));
        } else {
            self.notifier.success(&format!(
                "{}: {} sent, {} skipped",
                service.display_name(),
                result.added,
                result.skipped
            ));
        }
        self.after_mutation();
        tokio::time::sleep(self.settings.confirm_delay).await;
        self.controls.finish(&control);
        self.refresh_bulk_state();
        Ok(result)
    }

    pub async fn delete(&mut self, id: &RecordId) -> Result<bool> {
        let control = ControlId::Delete(id.clone());
        self.begin_control(&control)?;

        let deleted = match self.api.delete(id).await {
            Ok(deleted) => deleted,
            Err(e) => return Err(self.report_failure(Some(&control), "Delete failed", e)),
        };
        if !deleted {
            debug!("Server had no record {} to delete", id);
        }

        self.controls.confirm(&control);
        self.remove_records(std::slice::from_ref(id));
        self.notifier.success("Record deleted");
        tokio::time::sleep(self.settings.delete_confirm_delay).await;
        // The row is gone, so its control goes with it
        self.controls.forget_record(id);
        Ok(deleted)
    }

    /// Delete every selected id. Returns the server's deleted count.
    pub async fn bulk_delete(&mut self) -> Result<usize> {
        if self.selection.is_empty() {
            return Err(self.reject(PreconditionError::EmptySelection));
        }
        let ids = self.selection.all();
        let control = ControlId::BulkDelete;
        self.begin_control(&control)?;

        let deleted = match self.api.bulk_delete(&ids).await {
            Ok(deleted) => deleted,
            Err(e) => return Err(self.report_failure(Some(&control), "Bulk delete failed", e)),
        };
        if deleted != ids.len() {
            warn!("Requested {} deletions, server deleted {}", ids.len(), deleted);
        }

        self.controls.confirm(&control);
        self.remove_records(&ids);
        self.notifier.success(&format!("Deleted {} records", deleted));
        tokio::time::sleep(self.settings.delete_confirm_delay).await;
        self.controls.finish(&control);
        self.refresh_bulk_state();
        Ok(deleted)
    }

    /// Ask the server how the selection would merge
    pub async fn merge_preview(&mut self) -> Result<MergePreview> {
        let ids = self.selection.all();
        if let Err(e) = self.merge.request_preview(ids.clone()) {
            return Err(self.reject(e));
        }
        let control = ControlId::MergePreview;
        self.begin_control(&control)?;

        match self.api.merge_preview(&ids).await {
            Ok(preview) => {
                debug!("Merge preview: {}", preview.summary());
                self.merge.preview_loaded(preview.clone());
                self.controls.finish(&control);
                self.refresh_bulk_state();
                Ok(preview)
            }
            Err(e) => {
                self.merge.preview_failed(e.to_string());
                Err(self.report_failure(Some(&control), "Merge preview failed", e))
            }
        }
    }

    /// Commit the shown preview; non-survivors leave the list and the selection
    pub async fn merge_commit(&mut self) -> Result<usize> {
        let groups = match self.merge.begin_commit() {
            Ok(groups) => groups,
            Err(e) => return Err(self.reject(e)),
        };
        let control = ControlId::MergeCommit;
        if let Err(e) = self.begin_control(&control) {
            self.merge.commit_failed("request already in flight");
            return Err(e);
        }

        let merged = match self.api.merge_commit(&groups).await {
            Ok(merged) => merged,
            Err(e) => {
                self.merge.commit_failed(e.to_string());
                return Err(self.report_failure(Some(&control), "Merge failed", e));
            }
        };

        let removed = self.merge.commit_succeeded(merged);
        info!("Merged {} records into {} survivors", merged, groups.len());
        self.controls.confirm(&control);
        self.remove_records(&removed);
        self.notifier.success(&format!("Merged {} records", merged));
        tokio::time::sleep(self.settings.confirm_delay).await;
        self.controls.finish(&control);
        self.refresh_bulk_state();
        Ok(merged)
    }

    /// Close the merge dialog
    pub fn close_merge(&mut self) {
        self.merge.reset();
        self.refresh_bulk_state();
    }

    /// Drop ids from the grid, the index, the selection and the pending set,
    /// then redraw on the same page.
    pub fn remove_records(&mut self, ids: &[RecordId]) {
        for id in ids {
            if let Some(handle) = self.snapshot.remove(id) {
                self.grid.remove_row(handle);
            }
            self.selection.remove(id);
            self.poller.registry.remove(id);
            self.controls.forget_record(id);
        }
        if self.poller.registry.is_empty() {
            self.poller.cancel();
        }
        debug!("Removed {} records", ids.len());
        self.after_mutation();
    }

    pub(crate) fn after_mutation(&mut self) {
        self.redraw(true);
        self.recompute_stats();
    }

    /// Patch cached info for `id` and re-render its row
    pub(crate) fn patch_record(&mut self, id: &RecordId, patch: impl FnOnce(&mut WantedRecord)) -> bool {
        let Some(record) = self.snapshot.lookup_mut(id, &self.grid) else {
            debug!("No row for {}, skipping patch", id);
            return false;
        };
        patch(record);
        let record = record.clone();
        self.render_record(&record)
    }

    pub(crate) fn render_record(&mut self, record: &WantedRecord) -> bool {
        let marker = self.marker_for(record);
        let rendered = match self.snapshot.handle(&record.id) {
            Some(handle) => self.grid.render_row(handle, record, marker),
            None => false,
        };
        if !rendered {
            self.snapshot.invalidate(&record.id);
        }
        rendered
    }

    fn mark_present(&mut self, id: &RecordId, service: Service, root_folder: Option<&str>) {
        self.patch_record(id, |record| {
            record.set_in_service(service, true);
            if let Some(root) = root_folder {
                record.root_paths.set(service, root.to_string());
            }
        });
    }

    /// Presence is left to the next reload; only the chosen root is recorded
    fn set_root_folder(&mut self, id: &RecordId, service: Service, root_folder: &str) {
        self.patch_record(id, |record| record.root_paths.set(service, root_folder.to_string()));
    }

    fn mark_pending(&mut self, id: &RecordId) {
        self.poller.registry.insert(id.clone());
        if let Some(record) = self.snapshot.lookup(id, &self.grid).cloned() {
            self.render_record(&record);
        }
    }

    /// Surface a failed precondition without touching the network
    fn reject(&mut self, error: PreconditionError) -> WantedError {
        debug!("Rejected locally: {}", error);
        self.notifier.warning(&error.to_string());
        WantedError::Precondition(error)
    }
}
