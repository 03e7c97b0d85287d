mod task_tests;
mod vm_status_tests;
